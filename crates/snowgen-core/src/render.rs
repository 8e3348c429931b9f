//! Named-placeholder rendering for SQL templates
//!
//! Templates reference fields as `{field}`. `{{` and `}}` produce literal
//! braces. A placeholder with no matching field is an error, so a template
//! never renders half-filled.

use std::collections::BTreeMap;

/// Errors raised while rendering a template
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Template references unknown placeholder `{name}`")]
    UnknownPlaceholder { name: String },

    #[error("Invalid placeholder `{{{placeholder}}}` at byte {position}")]
    InvalidPlaceholder { placeholder: String, position: usize },

    #[error("Unmatched `{brace}` at byte {position}")]
    UnmatchedBrace { brace: char, position: usize },
}

/// Substitute every `{field}` in `template` with its value from `fields`
pub fn render_template(template: &str, fields: &BTreeMap<String, String>) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let start = pos + 1;
                let mut end = None;
                for (i, inner) in chars.by_ref() {
                    if inner == '}' {
                        end = Some(i);
                        break;
                    }
                    if inner == '{' {
                        return Err(RenderError::UnmatchedBrace { brace: '{', position: pos });
                    }
                }

                let end = end.ok_or(RenderError::UnmatchedBrace { brace: '{', position: pos })?;
                let name = &template[start..end];

                if !is_identifier(name) {
                    return Err(RenderError::InvalidPlaceholder {
                        placeholder: name.to_string(),
                        position: pos,
                    });
                }

                let value = fields
                    .get(name)
                    .ok_or_else(|| RenderError::UnknownPlaceholder { name: name.to_string() })?;
                out.push_str(value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(RenderError::UnmatchedBrace { brace: '}', position: pos });
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
