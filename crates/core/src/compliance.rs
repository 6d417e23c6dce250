//! Regulatory compliance analysis over the period records.
//!
//! [`analyze`] is pure: it reads the records and settings and returns a
//! [`ComplianceReport`] that the compliance panel renders. Thresholds live in
//! [`ComplianceSettings`] so they can be tuned without code changes.

use crate::format::parse_period;
use crate::record::{PeriodRecord, chronological, period_order};
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rate cut-offs in percent, highest first.
///
/// `rate >= compliant_low` is compliant with low severity, `>= compliant_medium`
/// compliant with medium severity, `>= noncompliant_medium` non-compliant with
/// medium severity, anything lower non-compliant with high severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTiers {
    pub compliant_low: f64,
    pub compliant_medium: f64,
    pub noncompliant_medium: f64,
}

impl RateTiers {
    pub const fn new(compliant_low: f64, compliant_medium: f64, noncompliant_medium: f64) -> Self {
        Self {
            compliant_low,
            compliant_medium,
            noncompliant_medium,
        }
    }

    pub fn classify(&self, rate: f64) -> (bool, Severity) {
        if rate >= self.compliant_low {
            (true, Severity::Low)
        } else if rate >= self.compliant_medium {
            (true, Severity::Medium)
        } else if rate >= self.noncompliant_medium {
            (false, Severity::Medium)
        } else {
            (false, Severity::High)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatoryAlertRule {
    /// Trailing periods without any submission that trigger the alert.
    pub consecutive_periods: usize,
    /// Estimated transfer lost per month, in reais.
    pub monthly_loss_estimate: f64,
    pub regulation: String,
}

impl Default for RegulatoryAlertRule {
    fn default() -> Self {
        Self {
            consecutive_periods: 6,
            monthly_loss_estimate: 8_000.0,
            regulation: "Portaria GM/MS Nº 6.907, de 29 de abril de 2025".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceSettings {
    pub payment: RateTiers,
    pub financial: RateTiers,
    pub expected_periods: usize,
    pub max_staleness_months: i32,
    /// Highest acceptable coefficient of variation of credentialed agents, in percent.
    pub max_variation_pct: f64,
    pub alert: RegulatoryAlertRule,
}

impl Default for ComplianceSettings {
    fn default() -> Self {
        Self {
            payment: RateTiers::new(95.0, 80.0, 60.0),
            financial: RateTiers::new(95.0, 85.0, 70.0),
            expected_periods: 3,
            max_staleness_months: 3,
            max_variation_pct: 15.0,
            alert: RegulatoryAlertRule::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Label shown on priority tags.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "BAIXA",
            Severity::Medium => "MÉDIA",
            Severity::High => "ALTA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    PaymentRate,
    FinancialExecution,
    Consistency,
    DataCompleteness,
    Timeliness,
}

impl Criterion {
    fn recommendation(&self) -> &'static str {
        match self {
            Criterion::PaymentRate => "Verificar processos de pagamento dos ACS",
            Criterion::FinancialExecution => "Revisar execução orçamentária e financeira",
            Criterion::Consistency | Criterion::DataCompleteness => "Melhorar coleta e consistência dos dados",
            Criterion::Timeliness => "Revisar conformidade regulatória",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFinding {
    pub criterion: Criterion,
    pub compliant: bool,
    pub severity: Severity,
    /// The measured figure (a percentage, a count, or months of delay).
    pub value: Option<f64>,
    pub description: String,
    pub details: String,
}

impl ComplianceFinding {
    fn new(criterion: Criterion, compliant: bool, severity: Severity, value: Option<f64>) -> Self {
        Self {
            criterion,
            compliant,
            severity,
            value,
            description: String::new(),
            details: String::new(),
        }
    }

    fn described(mut self, description: impl Into<String>, details: impl Into<String>) -> Self {
        self.description = description.into();
        self.details = details.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    Excellent,
    Good,
    NeedsAttention,
}

impl ComplianceLevel {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            ComplianceLevel::Excellent
        } else if rate >= 70.0 {
            ComplianceLevel::Good
        } else {
            ComplianceLevel::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplianceLevel::Excellent => "EXCELENTE",
            ComplianceLevel::Good => "BOM",
            ComplianceLevel::NeedsAttention => "REQUER ATENÇÃO",
        }
    }
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryAlert {
    /// Length of the trailing run of periods without submissions.
    pub consecutive_periods: usize,
    pub monthly_loss_estimate: f64,
    pub regulation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub findings: Vec<ComplianceFinding>,
    /// Share of compliant findings, in percent.
    pub compliance_rate: f64,
    pub level: ComplianceLevel,
    pub recommendations: Vec<String>,
    pub alert: Option<RegulatoryAlert>,
    pub latest_period: Option<String>,
}

impl ComplianceReport {
    pub fn compliant_count(&self) -> usize {
        self.findings.iter().filter(|f| f.compliant).count()
    }

    pub fn non_compliant(&self) -> impl Iterator<Item = &ComplianceFinding> {
        self.findings.iter().filter(|f| !f.compliant)
    }
}

fn percent(value: f64) -> String {
    format!("{value:.1}%").replace('.', ",")
}

fn payment_rate(latest: &PeriodRecord, tiers: &RateTiers) -> ComplianceFinding {
    if latest.credentialed_count == 0 {
        return ComplianceFinding::new(Criterion::PaymentRate, false, Severity::High, None).described(
            "Dados de ACS credenciados não disponíveis",
            "Impossível calcular taxa de pagamento",
        );
    }
    let rate = latest.paid_count as f64 / latest.credentialed_count as f64 * 100.0;
    let (compliant, severity) = tiers.classify(rate);
    ComplianceFinding::new(Criterion::PaymentRate, compliant, severity, Some(rate)).described(
        format!(
            "Taxa de pagamento ACS: {} ({}/{})",
            percent(rate),
            latest.paid_count,
            latest.credentialed_count
        ),
        format!("Meta: ≥{} | Atual: {}", percent(tiers.compliant_medium), percent(rate)),
    )
}

fn financial_execution(latest: &PeriodRecord, tiers: &RateTiers) -> ComplianceFinding {
    if latest.expected_amount <= 0.0 {
        return ComplianceFinding::new(Criterion::FinancialExecution, false, Severity::Medium, None)
            .described("Dados financeiros incompletos", "Valores esperados não informados");
    }
    let rate = latest.received_amount / latest.expected_amount * 100.0;
    let (compliant, severity) = tiers.classify(rate);
    ComplianceFinding::new(Criterion::FinancialExecution, compliant, severity, Some(rate)).described(
        format!("Execução financeira: {}", percent(rate)),
        format!(
            "{} de {} esperados",
            crate::format::currency(latest.received_amount),
            crate::format::currency(latest.expected_amount)
        ),
    )
}

/// Coefficient of variation of credentialed agents over the last three
/// periods. `None` with fewer than three periods or a zero mean.
fn consistency(records: &[PeriodRecord], max_variation_pct: f64) -> Option<ComplianceFinding> {
    if records.len() < 3 {
        return None;
    }
    let recent: Vec<f64> = records[records.len() - 3..]
        .iter()
        .map(|r| r.credentialed_count as f64)
        .collect();
    let mean = recent.iter().sum::<f64>() / recent.len() as f64;
    if mean <= 0.0 {
        return None;
    }
    let variance = recent.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (recent.len() - 1) as f64;
    let variation = variance.sqrt() / mean * 100.0;
    let compliant = variation <= max_variation_pct;
    let severity = if compliant { Severity::Low } else { Severity::Medium };
    Some(
        ComplianceFinding::new(Criterion::Consistency, compliant, severity, Some(variation)).described(
            format!("Estabilidade dos dados: {}", percent(100.0 - variation)),
            format!("Coeficiente de variação: {}", percent(variation)),
        ),
    )
}

fn completeness(available: usize, expected: usize) -> ComplianceFinding {
    let compliant = available >= expected;
    let severity = match (compliant, available) {
        (true, _) => Severity::Low,
        (false, 0 | 1) => Severity::High,
        (false, _) => Severity::Medium,
    };
    ComplianceFinding::new(Criterion::DataCompleteness, compliant, severity, Some(available as f64)).described(
        format!("Completude dos dados: {available}/{expected} meses"),
        format!("Histórico disponível: {available} competências"),
    )
}

fn timeliness(latest_period: &str, as_of: NaiveDate, max_months: i32) -> ComplianceFinding {
    let Some(start) = parse_period(latest_period) else {
        debug!("Unparseable period label '{}'", latest_period);
        return ComplianceFinding::new(Criterion::Timeliness, false, Severity::Low, None).described(
            "Formato de competência inválido",
            format!("Competência: {latest_period}"),
        );
    };
    let months = (as_of.year() - start.year()) * 12 + as_of.month() as i32 - start.month() as i32;
    let compliant = months <= max_months;
    let severity = if compliant { Severity::Low } else { Severity::Medium };
    ComplianceFinding::new(Criterion::Timeliness, compliant, severity, Some(months as f64)).described(
        format!("Atualidade dos dados: {months} meses de defasagem"),
        format!("Última competência: {latest_period}"),
    )
}

fn recommendations(findings: &[ComplianceFinding]) -> Vec<String> {
    let failing: Vec<&ComplianceFinding> = findings.iter().filter(|f| !f.compliant).collect();
    let mut recommendations: Vec<String> = failing
        .iter()
        .map(|f| f.criterion.recommendation())
        .unique()
        .map(str::to_string)
        .collect();
    if failing.len() > 1 {
        recommendations.push("Implementar plano de ação para múltiplas não conformidades".to_string());
    }
    recommendations
}

fn regulatory_alert(records: &[PeriodRecord], rule: &RegulatoryAlertRule) -> Option<RegulatoryAlert> {
    let run = records.iter().rev().take_while(|r| r.is_empty_submission()).count();
    if rule.consecutive_periods == 0 || run < rule.consecutive_periods {
        return None;
    }
    info!("Regulatory alert: {} consecutive periods without submission", run);
    Some(RegulatoryAlert {
        consecutive_periods: run,
        monthly_loss_estimate: rule.monthly_loss_estimate,
        regulation: rule.regulation.clone(),
    })
}

/// Evaluates every criterion against the most recent period.
///
/// `records` and `periods` may arrive in any order. The most recent covered
/// period drives the timeliness check, falling back to the latest record when
/// `periods` is empty. `as_of` is the report date.
pub fn analyze(
    records: &[PeriodRecord],
    periods: &[String],
    as_of: NaiveDate,
    settings: &ComplianceSettings,
) -> ComplianceReport {
    let mut sorted = records.to_vec();
    sorted.sort_by(chronological);

    let mut findings = Vec::new();
    if let Some(latest) = sorted.last() {
        findings.push(payment_rate(latest, &settings.payment));
        findings.push(financial_execution(latest, &settings.financial));
        findings.extend(consistency(&sorted, settings.max_variation_pct));
    }
    findings.push(completeness(sorted.len(), settings.expected_periods));

    let latest_period = periods
        .iter()
        .max_by(|a, b| period_order(a, b))
        .cloned()
        .or_else(|| sorted.last().map(|r| r.period.clone()));
    if let Some(period) = &latest_period {
        findings.push(timeliness(period, as_of, settings.max_staleness_months));
    }

    let compliant = findings.iter().filter(|f| f.compliant).count();
    let compliance_rate = if findings.is_empty() {
        0.0
    } else {
        compliant as f64 / findings.len() as f64 * 100.0
    };
    info!(
        "Compliance analysis completed: {}/{} items compliant",
        compliant,
        findings.len()
    );

    ComplianceReport {
        recommendations: recommendations(&findings),
        alert: regulatory_alert(&sorted, &settings.alert),
        level: ComplianceLevel::from_rate(compliance_rate),
        compliance_rate,
        findings,
        latest_period,
    }
}
