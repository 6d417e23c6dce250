use acs_report_types::{Color, DataValidationError};
use serde::{Deserialize, Serialize};

/// A4 portrait, in points.
pub const A4_WIDTH: f32 = 595.2756;
pub const A4_HEIGHT: f32 = 841.8898;

/// Vertical spacing tiers used between report blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingScale {
    pub large: f32,
    pub medium: f32,
    pub small: f32,
}

impl Default for SpacingScale {
    fn default() -> Self {
        Self {
            large: 60.0,
            medium: 40.0,
            small: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub title: f32,
    pub header: f32,
    pub body: f32,
    pub small: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 16.0,
            header: 14.0,
            body: 10.0,
            small: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub dashboard_blue: Color,
    pub dashboard_green: Color,
    pub dashboard_orange: Color,
    pub dashboard_gray: Color,
    pub light_green: Color,
    pub text: Color,
    pub background: Color,
    pub table_stripe: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            dashboard_blue: Color::rgb(0x1F, 0x49, 0x7D),
            dashboard_green: Color::rgb(0x00, 0xB0, 0x50),
            dashboard_orange: Color::rgb(0xFF, 0xA5, 0x00),
            dashboard_gray: Color::rgb(0xA6, 0xA6, 0xA6),
            light_green: Color::rgb(0xE2, 0xEF, 0xDA),
            text: Color::BLACK,
            background: Color::WHITE,
            table_stripe: Color::from_unit(0.94, 0.94, 0.94),
        }
    }
}

/// Immutable page geometry and visual constants for one document.
///
/// `content_width` and `content_height` are derived, never stored, so they
/// always agree with the page and margin values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub footer_height: f32,
    pub spacing: SpacingScale,
    pub fonts: FontSizes,
    pub table_row_height: f32,
    pub table_header_height: f32,
    pub palette: Palette,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: 40.0,
            footer_height: 80.0,
            spacing: SpacingScale::default(),
            fonts: FontSizes::default(),
            table_row_height: 20.0,
            table_header_height: 25.0,
            palette: Palette::default(),
        }
    }
}

impl PageConfig {
    /// Builds a config with custom page geometry and default styling.
    pub fn with_geometry(
        page_width: f32,
        page_height: f32,
        margin: f32,
        footer_height: f32,
    ) -> Result<Self, DataValidationError> {
        let config = Self {
            page_width,
            page_height,
            margin,
            footer_height,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin - self.footer_height
    }

    /// Lowest Y a block may reach before it runs into the footer zone.
    pub fn min_y(&self) -> f32 {
        self.margin + self.footer_height
    }

    /// Y of the first line on a fresh page.
    pub fn top_y(&self) -> f32 {
        self.page_height - self.margin
    }

    pub fn validate(&self) -> Result<(), DataValidationError> {
        let finite = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("margin", self.margin),
            ("footer_height", self.footer_height),
        ];
        for (field, value) in finite {
            if !value.is_finite() || value < 0.0 {
                return Err(DataValidationError::new(
                    field,
                    format!("must be a finite value >= 0, got {value}"),
                ));
            }
        }
        if self.content_width() <= 0.0 {
            return Err(DataValidationError::new(
                "content_width",
                format!(
                    "page width {} leaves no room inside margins of {}",
                    self.page_width, self.margin
                ),
            ));
        }
        if self.content_height() <= 0.0 {
            return Err(DataValidationError::new(
                "content_height",
                format!(
                    "page height {} leaves no room inside margins of {} and a footer of {}",
                    self.page_height, self.margin, self.footer_height
                ),
            ));
        }
        Ok(())
    }
}
