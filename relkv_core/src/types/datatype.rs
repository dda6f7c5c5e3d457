use std::fmt;

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    FixedText(usize),
    VarText,
}

impl ColumnType {
    /// Payload width in bytes, or `None` for variable-length text.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ColumnType::Integer => Some(4),
            ColumnType::Real => Some(8),
            ColumnType::FixedText(len) => Some(*len),
            ColumnType::VarText => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => f.write_str("int"),
            ColumnType::Real => f.write_str("real"),
            ColumnType::FixedText(len) => write!(f, "char({len})"),
            ColumnType::VarText => f.write_str("varchar"),
        }
    }
}

pub fn parse_datatype(s: &str) -> Result<ColumnType, String> {
    let lower = s.trim().to_lowercase();
    match lower.as_str() {
        "int" | "integer" => Ok(ColumnType::Integer),
        "real" | "double" => Ok(ColumnType::Real),
        "varchar" | "text" => Ok(ColumnType::VarText),
        other => {
            if let Some(inner) = other
                .strip_prefix("char(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                let len: usize = inner
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid char length in '{s}'"))?;
                if len == 0 {
                    return Err("char length must be at least 1".to_string());
                }
                return Ok(ColumnType::FixedText(len));
            }
            Err(format!("Unknown type '{other}'. Use int|real|char(n)|varchar"))
        }
    }
}
