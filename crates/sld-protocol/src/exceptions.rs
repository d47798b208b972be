//! OGC service exception reports.

use quick_xml::escape::escape;

use sld_common::SldError;

/// Generate an OGC ServiceExceptionReport document.
pub fn service_exception(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceExceptionReport xmlns="http://www.opengis.net/ogc" version="1.3.0">
  <ServiceException code="{}">{}</ServiceException>
</ServiceExceptionReport>"#,
        escape(code),
        escape(message)
    )
}

/// Exception report for an error, using its OGC exception code.
pub fn error_report(err: &SldError) -> String {
    service_exception(err.exception_code(), &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_escaped() {
        let xml = service_exception("InvalidStyle", "bad <Name> & more");
        assert!(xml.contains(r#"<ServiceException code="InvalidStyle">bad &lt;Name&gt; &amp; more</ServiceException>"#));
    }

    #[test]
    fn test_error_report_uses_exception_code() {
        let err = SldError::MissingParameter("layer".to_string());
        let xml = error_report(&err);
        assert!(xml.contains(r#"code="MissingParameterValue""#));
        assert!(xml.contains("Missing required parameter: layer"));
    }
}
