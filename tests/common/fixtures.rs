use acs_report::{PeriodRecord, ReportInput};
use chrono::{NaiveDate, NaiveDateTime};

pub fn report_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 10)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap()
}

/// Three months of healthy Anadia/AL data: 44 credentialed, 42 or 43 paid.
pub fn anadia_input() -> ReportInput {
    ReportInput::new(
        "Anadia",
        "AL",
        vec![
            PeriodRecord::new("202503", 12_000.0, 11_900.0, 44, 43),
            PeriodRecord::new("202501", 12_000.0, 11_600.0, 44, 42),
            PeriodRecord::new("202502", 12_000.0, 11_750.0, 44, 42),
        ],
    )
    .with_generated_at(report_date())
}

pub fn single_period_input() -> ReportInput {
    ReportInput::new(
        "Anadia",
        "AL",
        vec![PeriodRecord::new("202503", 12_000.0, 11_900.0, 44, 43)],
    )
    .with_generated_at(report_date())
}

/// Twelve months where the last `silent` periods received nothing and paid nobody.
pub fn silent_tail_input(silent: usize) -> ReportInput {
    let records = (1..=12)
        .map(|m| {
            if m > 12 - silent {
                PeriodRecord::new(format!("2024{m:02}"), 12_000.0, 0.0, 44, 0)
            } else {
                PeriodRecord::new(format!("2024{m:02}"), 12_000.0, 11_800.0, 44, 43)
            }
        })
        .collect();
    ReportInput::new("Anadia", "AL", records).with_generated_at(
        NaiveDate::from_ymd_opt(2025, 1, 5)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap(),
    )
}

/// A smallest valid PNG-decodable logo, 4x2 pixels.
pub fn logo_png() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(4, 2, image::Rgb([0x1F, 0x49, 0x7D]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
