//! Parameter summary printed on the second page

use std::fmt;

use crate::config::AuthorInfo;
use crate::domain::{CircleSpec, FigureStyle, Point, PointColor};
use crate::error::{Error, Result};

/// Heading line of the summary and the document title
pub const TITLE: &str = "Body na kružnici";

const CENTER: &str = "Střed: ";
const RADIUS: &str = "Poloměr: ";
const COUNT: &str = "Počet bodů: ";
const COLOR: &str = "Barva: ";
const AUTHOR: &str = "Autor: ";
const CONTACT: &str = "Kontakt: ";

/// Everything the second page states about an export
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSummary {
    pub center: Point,
    pub radius: f64,
    pub unit: String,
    pub point_count: usize,
    pub color: PointColor,
    pub author: AuthorInfo,
}

/// Shortest round-trip form as Python's `repr` writes it
///
/// Positional with at least one decimal for exponents in `-4..16` ("1.0",
/// "0.0001"), otherwise scientific with a signed two-digit exponent ("1e-07",
/// "2.5e+16").
pub fn format_float(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v:?}");
    }
    let scientific = format!("{v:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{v:?}");
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..16).contains(&exponent) {
        format!("{v:?}")
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

impl ParamSummary {
    pub fn new(spec: &CircleSpec, style: &FigureStyle, author: &AuthorInfo) -> Self {
        Self {
            center: spec.center,
            radius: spec.radius,
            unit: style.unit.clone(),
            point_count: spec.point_count,
            color: style.color,
            author: author.clone(),
        }
    }

    /// The multi-line text block, newline-terminated
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn spec(&self) -> CircleSpec {
        CircleSpec::new(self.center, self.radius, self.point_count)
    }

    pub fn style(&self) -> FigureStyle {
        FigureStyle {
            color: self.color,
            unit: self.unit.clone(),
        }
    }

    /// Every field stays on its own line of the text block
    pub fn check(&self) -> Result<()> {
        let fields = [
            ("unit", &self.unit),
            ("author name", &self.author.name),
            ("author email", &self.author.email),
        ];
        for (field, value) in fields {
            if let Some(c) = value.chars().find(|c| c.is_control()) {
                return Err(Error::Summary(format!(
                    "{field} {value:?} contains control character {c:?}"
                )));
            }
        }
        Ok(())
    }

    /// Read a block produced by [`to_text`](Self::to_text)
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let mut next = |prefix: &str| next_field(&mut lines, prefix);

        let title = next("")?;
        if title != TITLE {
            return Err(Error::Summary(format!("unexpected title {title:?}")));
        }

        let center = next(CENTER)?;
        let (x, y) = center
            .strip_prefix('(')
            .and_then(|c| c.strip_suffix(')'))
            .and_then(|c| c.split_once(", "))
            .ok_or_else(|| Error::Summary(format!("bad center {center:?}")))?;
        let center = Point::new(parse_float(x)?, parse_float(y)?);

        let radius_line = next(RADIUS)?;
        let (radius, unit) = radius_line
            .split_once(' ')
            .ok_or_else(|| Error::Summary(format!("bad radius {radius_line:?}")))?;
        let radius = parse_float(radius)?;
        let unit = unit.to_string();

        let count = next(COUNT)?;
        let point_count = count
            .parse()
            .map_err(|_| Error::Summary(format!("bad point count {count:?}")))?;

        let color = PointColor::from_hex(next(COLOR)?)
            .map_err(|e| Error::Summary(e.to_string()))?;

        let name = next(AUTHOR)?.to_string();
        let email = next(CONTACT)?.to_string();

        Ok(Self {
            center,
            radius,
            unit,
            point_count,
            color,
            author: AuthorInfo { name, email },
        })
    }
}

/// Next non-blank line, with `prefix` stripped
fn next_field<'a>(lines: &mut std::str::Lines<'a>, prefix: &str) -> Result<&'a str> {
    let line = lines
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| Error::Summary(format!("missing line {prefix:?}")))?;
    line.strip_prefix(prefix)
        .ok_or_else(|| Error::Summary(format!("expected {prefix:?}, got {line:?}")))
}

fn parse_float(s: &str) -> Result<f64> {
    s.parse()
        .map_err(|_| Error::Summary(format!("bad number {s:?}")))
}

impl fmt::Display for ParamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f)?;
        writeln!(
            f,
            "{CENTER}({}, {})",
            format_float(self.center.x),
            format_float(self.center.y)
        )?;
        writeln!(f, "{RADIUS}{} {}", format_float(self.radius), self.unit)?;
        writeln!(f, "{COUNT}{}", self.point_count)?;
        writeln!(f, "{COLOR}{}", self.color)?;
        writeln!(f)?;
        writeln!(f, "{AUTHOR}{}", self.author.name)?;
        writeln!(f, "{CONTACT}{}", self.author.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ParamSummary {
        ParamSummary {
            center: Point::new(0.0, 0.0),
            radius: 1.0,
            unit: "m".to_string(),
            point_count: 10,
            color: PointColor::default(),
            author: AuthorInfo::default(),
        }
    }

    #[test]
    fn test_default_text_layout() {
        let text = summary().to_text();
        let expected = "Body na kružnici\n\
                        \n\
                        Střed: (0.0, 0.0)\n\
                        Poloměr: 1.0 m\n\
                        Počet bodů: 10\n\
                        Barva: #ff0000\n\
                        \n\
                        Autor: Valentýna Čížová\n\
                        Kontakt: 277735@vutbr.cz\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_float_format() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0), "-0.0");
    }

    #[test]
    fn test_float_format_exponents() {
        assert_eq!(format_float(1e-7), "1e-07");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(-2.5e20), "-2.5e+20");
        assert_eq!(format_float(1e-300), "1e-300");
        for v in [1e-7, 1e16, -2.5e20, 1.7976931348623157e308] {
            assert_eq!(format_float(v).parse::<f64>().unwrap(), v);
        }
    }

    #[test]
    fn test_check_rejects_multiline_fields() {
        assert!(summary().check().is_ok());
        let broken = ParamSummary {
            unit: "m\nPočet bodů: 3".to_string(),
            ..summary()
        };
        assert!(matches!(broken.check(), Err(Error::Summary(_))));
        let broken = ParamSummary {
            author: AuthorInfo {
                name: "A\rB".to_string(),
                email: String::new(),
            },
            ..summary()
        };
        assert!(broken.check().is_err());
    }

    #[test]
    fn test_parse_round_trip_non_latin() {
        let written = ParamSummary {
            unit: "μm".to_string(),
            author: AuthorInfo {
                name: "Michał Żółć".to_string(),
                email: "michal@example.pl".to_string(),
            },
            ..summary()
        };
        assert_eq!(ParamSummary::parse(&written.to_text()).unwrap(), written);
    }

    #[test]
    fn test_parse_round_trip() {
        let written = ParamSummary {
            center: Point::new(-3.25, 1e-7),
            radius: 12.345678901234,
            unit: "light years".to_string(),
            point_count: 77,
            color: PointColor::new(1, 2, 3),
            author: AuthorInfo {
                name: "Jana Nováková".to_string(),
                email: "jana@example.cz".to_string(),
            },
        };
        let parsed = ParamSummary::parse(&written.to_text()).unwrap();
        assert_eq!(parsed, written);
        assert_eq!(parsed.spec().point_count, 77);
        assert_eq!(parsed.style().unit, "light years");
    }

    #[test]
    fn test_parse_empty_unit() {
        let written = ParamSummary {
            unit: String::new(),
            ..summary()
        };
        let parsed = ParamSummary::parse(&written.to_text()).unwrap();
        assert_eq!(parsed.unit, "");
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(ParamSummary::parse("").is_err());
        assert!(ParamSummary::parse("Body na kružnici\n\nStřed: (0.0, 0.0)\n").is_err());
        let broken = summary().to_text().replace("Počet bodů: 10", "Počet bodů: ten");
        assert!(matches!(ParamSummary::parse(&broken), Err(Error::Summary(_))));
    }
}
