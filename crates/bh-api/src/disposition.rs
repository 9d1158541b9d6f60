//! Filename handling for downloaded reports.

use bh_core::ModelId;

/// Name used when the server does not suggest one.
pub fn default_report_filename(id: &ModelId) -> String {
    format!("federation_report_{}.pdf", id)
}

/// Extract the `filename` parameter from a `Content-Disposition` header value.
///
/// Accepts quoted and unquoted values. The extended `filename*` form is not
/// used. Directory components are stripped so the result is a bare file name.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    split_params(header)
        .into_iter()
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("filename")
                .then(|| unquote(value.trim()))
        })
        .find_map(|value| sanitize(&value))
}

// Split on `;` outside of quoted strings.
fn split_params(header: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in header.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => params.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    params.push(current);
    params
}

fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' => break,
            _ => out.push(c),
        }
    }
    out
}

fn sanitize(value: &str) -> Option<String> {
    let base = value.rsplit(['/', '\\']).next().unwrap_or(value).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_filename() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="foo.pdf""#).as_deref(),
            Some("foo.pdf")
        );
    }

    #[test]
    fn unquoted_filename() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=m-1_report.pdf").as_deref(),
            Some("m-1_report.pdf")
        );
    }

    #[test]
    fn quoted_filename_may_contain_semicolons_and_escapes() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="a;b \"c\".pdf"; size=10"#)
                .as_deref(),
            Some(r#"a;b "c".pdf"#)
        );
    }

    #[test]
    fn extended_form_alone_is_ignored() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"),
            None
        );
        assert_eq!(
            filename_from_content_disposition(
                "attachment; filename*=UTF-8''x.pdf; filename=\"plain.pdf\""
            )
            .as_deref(),
            Some("plain.pdf")
        );
    }

    #[test]
    fn parameter_name_is_case_insensitive() {
        assert_eq!(
            filename_from_content_disposition("inline; FileName=\"Report.PDF\"").as_deref(),
            Some("Report.PDF")
        );
    }

    #[test]
    fn directory_components_are_stripped() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="../../etc/passwd""#)
                .as_deref(),
            Some("passwd")
        );
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="C:\\temp\\r.pdf""#)
                .as_deref(),
            Some("r.pdf")
        );
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="..""#),
            None
        );
    }

    #[test]
    fn missing_parameter_yields_none() {
        assert_eq!(filename_from_content_disposition("attachment"), None);
        assert_eq!(filename_from_content_disposition(""), None);
    }

    #[test]
    fn default_name_uses_model_id() {
        let id = ModelId::parse("65f0").unwrap();
        assert_eq!(default_report_filename(&id), "federation_report_65f0.pdf");
    }
}
