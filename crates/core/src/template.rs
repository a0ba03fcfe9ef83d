use chrono::{DateTime, Datelike, Local};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Token(Token),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Original filename without extension.
    Name,
    /// Modification date of the source file, YYYYMMDD.
    Date,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is empty")]
    Empty,
    #[error("unbalanced braces in template")]
    UnbalancedBraces,
    #[error("unknown template token: {0}")]
    UnknownToken(String),
}

pub fn validate_template(input: &str) -> Result<(), TemplateError> {
    parse_template(input).map(|_| ())
}

pub fn parse_template(input: &str) -> Result<Vec<TemplatePart>, TemplateError> {
    if input.is_empty() {
        return Err(TemplateError::Empty);
    }

    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if !literal.is_empty() {
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                }
                let mut token = String::new();
                let mut found_close = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        found_close = true;
                        break;
                    }
                    if next == '{' {
                        return Err(TemplateError::UnbalancedBraces);
                    }
                    token.push(next);
                }
                if !found_close || token.is_empty() {
                    return Err(TemplateError::UnbalancedBraces);
                }
                parts.push(TemplatePart::Token(parse_token(&token)?));
            }
            '}' => return Err(TemplateError::UnbalancedBraces),
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    if parts.is_empty() {
        return Err(TemplateError::Empty);
    }

    Ok(parts)
}

pub fn render_template(
    parts: &[TemplatePart],
    stem: &str,
    modified: Option<DateTime<Local>>,
) -> String {
    let mut output = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(s) => output.push_str(s),
            TemplatePart::Token(Token::Name) => output.push_str(stem),
            TemplatePart::Token(Token::Date) => {
                if let Some(date) = modified {
                    output.push_str(&format!(
                        "{:04}{:02}{:02}",
                        date.year(),
                        date.month(),
                        date.day()
                    ));
                }
            }
        }
    }
    output
}

fn parse_token(token: &str) -> Result<Token, TemplateError> {
    match token {
        "name" => Ok(Token::Name),
        "date" => Ok(Token::Date),
        other => Err(TemplateError::UnknownToken(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_template_ok() {
        let parsed = parse_template("{name}-thumb").expect("must parse");
        assert_eq!(
            parsed,
            vec![
                TemplatePart::Token(Token::Name),
                TemplatePart::Literal("-thumb".to_string()),
            ]
        );
    }

    #[test]
    fn parse_template_invalid_unknown() {
        let err = parse_template("{filename}").expect_err("must fail");
        assert!(matches!(err, TemplateError::UnknownToken(_)));
    }

    #[test]
    fn parse_template_invalid_brace() {
        let err = parse_template("{name").expect_err("must fail");
        assert_eq!(err, TemplateError::UnbalancedBraces);
    }

    #[test]
    fn parse_template_rejects_empty() {
        assert_eq!(parse_template(""), Err(TemplateError::Empty));
    }

    #[test]
    fn render_substitutes_stem() {
        let parsed = parse_template("{name}-thumb").expect("must parse");
        assert_eq!(render_template(&parsed, "IMG_0001", None), "IMG_0001-thumb");
    }

    #[test]
    fn render_literal_only_template_ignores_stem() {
        let parsed = parse_template("fixed").expect("must parse");
        assert_eq!(render_template(&parsed, "IMG_0001", None), "fixed");
    }

    #[test]
    fn render_formats_date_token() {
        let parsed = parse_template("{date}_{name}").expect("must parse");
        let modified = Local.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(
            render_template(&parsed, "IMG_0001", Some(modified)),
            "20240307_IMG_0001"
        );
    }

    #[test]
    fn render_drops_date_token_without_timestamp() {
        let parsed = parse_template("{date}{name}").expect("must parse");
        assert_eq!(render_template(&parsed, "IMG_0001", None), "IMG_0001");
    }
}
