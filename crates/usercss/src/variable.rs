//! Variable descriptors and value validation.
//!
//! A [`VariableDescriptor`] is built for every placeholder declaration found
//! in the CSS body. Its [`VarKind`] decides how values are validated and what
//! text is substituted into the compiled stylesheet.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five recognized variable types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    /// Hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    Color,
    /// Decimal number with an optional CSS unit (`16`, `1.5em`, `50%`),
    /// optionally bounded by `min`/`max`.
    Number,
    /// Free text. Also the fallback for unknown type names.
    Text,
    /// One value out of a fixed option list.
    Select,
    /// On/off toggle.
    Checkbox,
}

impl VarKind {
    /// Parses a type name case-insensitively. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<VarKind> {
        match name.trim().to_ascii_lowercase().as_str() {
            "color" => Some(VarKind::Color),
            "number" => Some(VarKind::Number),
            "text" => Some(VarKind::Text),
            "select" => Some(VarKind::Select),
            "checkbox" => Some(VarKind::Checkbox),
            _ => None,
        }
    }

    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Color => "color",
            VarKind::Number => "number",
            VarKind::Text => "text",
            VarKind::Select => "select",
            VarKind::Checkbox => "checkbox",
        }
    }

    /// Returns `true` for kinds that read an option list.
    pub fn takes_options(self) -> bool {
        matches!(self, VarKind::Select | VarKind::Checkbox)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a select or checkbox option list.
///
/// Deserializes from either a full object or a bare string, in which case
/// `value` and `label` are the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OptionRepr")]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    /// CSS fragment substituted instead of `value` when this option is chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
}

impl SelectOption {
    /// Creates an option whose label equals its value.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        SelectOption {
            label: value.clone(),
            value,
            css: None,
        }
    }

    /// Creates an option with a distinct label.
    pub fn labeled(value: impl Into<String>, label: impl Into<String>) -> Self {
        SelectOption {
            value: value.into(),
            label: label.into(),
            css: None,
        }
    }

    /// Attaches a CSS fragment.
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    /// Text inserted into the stylesheet when this option is selected.
    pub fn substitution(&self) -> &str {
        self.css.as_deref().unwrap_or(&self.value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionRepr {
    Bare(String),
    Full {
        value: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        css: Option<String>,
    },
}

impl From<OptionRepr> for SelectOption {
    fn from(repr: OptionRepr) -> Self {
        match repr {
            OptionRepr::Bare(value) => SelectOption::new(value),
            OptionRepr::Full { value, label, css } => SelectOption {
                label: label.unwrap_or_else(|| value.clone()),
                value,
                css,
            },
        }
    }
}

/// A typed, user-configurable variable declared by a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Placeholder identifier, conventionally starting with `--`.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VarKind,
    /// Declared default, verbatim.
    pub default: String,
    /// Effective value: the caller's override if any, else `default`.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl VariableDescriptor {
    /// Creates a descriptor whose value is its default.
    pub fn new(name: impl Into<String>, kind: VarKind, default: impl Into<String>) -> Self {
        let default = default.into();
        VariableDescriptor {
            name: name.into(),
            kind,
            value: default.clone(),
            default,
            min: None,
            max: None,
            options: Vec::new(),
        }
    }

    /// Checks `value` against this variable's kind and constraints.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self.kind {
            VarKind::Color => HexColor::parse(value).map(|_| ()),
            VarKind::Number => {
                let (n, _unit) = parse_dimension(value)
                    .ok_or_else(|| "expected a decimal number".to_string())?;
                if let Some(min) = self.min.filter(|min| n < *min) {
                    return Err(format!("below minimum {}", min));
                }
                if let Some(max) = self.max.filter(|max| n > *max) {
                    return Err(format!("above maximum {}", max));
                }
                Ok(())
            }
            VarKind::Text => Ok(()),
            VarKind::Select => {
                if self.options.is_empty() || self.option(value).is_some() {
                    Ok(())
                } else {
                    Err("not one of the declared options".to_string())
                }
            }
            VarKind::Checkbox => parse_checked(value)
                .map(|_| ())
                .ok_or_else(|| "expected 0, 1, true or false".to_string()),
        }
    }

    /// Returns the option whose value is `value`.
    pub fn option(&self, value: &str) -> Option<&SelectOption> {
        self.options.iter().find(|opt| opt.value == value)
    }

    /// Returns whether a checkbox is on. `None` for other kinds or
    /// unrecognized values.
    pub fn is_checked(&self) -> Option<bool> {
        match self.kind {
            VarKind::Checkbox => parse_checked(&self.value),
            _ => None,
        }
    }

    /// Text that replaces this variable's placeholders in compiled CSS.
    ///
    /// Selects map the chosen option to its CSS fragment when it has one.
    /// A checkbox with an `[off, on]` option pair maps to the matching entry.
    /// Everything else substitutes the effective value as-is.
    pub fn substitution(&self) -> &str {
        match self.kind {
            VarKind::Select => match self.option(&self.value) {
                Some(opt) => opt.substitution(),
                None => &self.value,
            },
            VarKind::Checkbox if self.options.len() == 2 => match self.is_checked() {
                Some(checked) => self.options[usize::from(checked)].substitution(),
                None => &self.value,
            },
            _ => &self.value,
        }
    }
}

/// A parsed hex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("Invalid hex color: {} (must start with #)", s))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid hex: {}", hex));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| format!("Invalid hex: {}", hex))
        };
        match hex.len() {
            // #rgb -> #rrggbb
            3 => Ok(HexColor {
                r: channel(0..1)? * 17,
                g: channel(1..2)? * 17,
                b: channel(2..3)? * 17,
                a: 255,
            }),
            6 => Ok(HexColor {
                r: channel(0..2)?,
                g: channel(2..4)?,
                b: channel(4..6)?,
                a: 255,
            }),
            8 => Ok(HexColor {
                r: channel(0..2)?,
                g: channel(2..4)?,
                b: channel(4..6)?,
                a: channel(6..8)?,
            }),
            _ => Err(format!(
                "Invalid hex color: #{} (must be 3, 6 or 8 digits)",
                hex
            )),
        }
    }
}

/// Parses a finite decimal number.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Splits a number with an optional unit suffix into its parts.
pub(crate) fn parse_dimension(s: &str) -> Option<(f64, &str)> {
    let s = s.trim();
    let split = s
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%')
        .len();
    let (number, unit) = s.split_at(split);
    parse_number(number).map(|n| (n, unit))
}

fn parse_checked(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Splits an option list on unescaped commas.
///
/// Each entry is `value`, `value:label` or `value:label=>css`; `\,` keeps a
/// literal comma inside an entry. Empty entries are skipped.
pub(crate) fn parse_options(list: &str) -> Vec<SelectOption> {
    split_unescaped_commas(list)
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(parse_option)
        .collect()
}

fn parse_option(entry: &str) -> SelectOption {
    let (head, css) = match entry.split_once("=>") {
        Some((head, css)) => (head.trim(), Some(css.trim().to_string())),
        None => (entry, None),
    };
    let option = match head.split_once(':') {
        Some((value, label)) => SelectOption::labeled(value.trim(), label.trim()),
        None => SelectOption::new(head),
    };
    SelectOption { css, ..option }
}

fn split_unescaped_commas(list: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut chars = list.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => entries.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    entries.push(current);
    entries
}
