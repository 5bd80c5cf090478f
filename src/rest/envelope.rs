/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;

pub const STAT_OK: &str = "ok";

/// Structured error reported inside an envelope as `<err code="" msg=""/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// The outer `<rsp stat="...">` wrapper every API response comes in.
///
/// `payload` is the raw inner XML of the root element and is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub status: String,
    pub error: Option<ApiError>,
    pub payload: String,
}

impl Envelope {
    /// Parses a complete response body
    pub fn parse(body: &str) -> Result<Self, FlickrError> {
        let mut reader = Reader::from_str(body);

        // Find the root element
        let root = loop {
            match reader.read_event()? {
                Event::Start(e) => break e,
                Event::Empty(e) => {
                    return Ok(Self {
                        status: attribute(&e, b"stat")?.unwrap_or_default(),
                        error: None,
                        payload: String::new(),
                    });
                }
                Event::Eof => {
                    return Err(FlickrError::ApiResponseMalformed(
                        "response has no root element".to_string(),
                    ));
                }
                _ => (),
            }
        };
        let status = attribute(&root, b"stat")?.unwrap_or_default();
        let payload_start = reader.buffer_position() as usize;

        let mut error = None;
        let mut depth = 0usize;
        let payload_end = loop {
            let event_start = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) => {
                    if depth == 0 && e.name().as_ref() == b"err" {
                        error = Some(api_error(&e)?);
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if depth == 0 && e.name().as_ref() == b"err" {
                        error = Some(api_error(&e)?);
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        break event_start;
                    }
                    depth -= 1;
                }
                Event::Eof => {
                    return Err(FlickrError::ApiResponseMalformed(
                        "response root element is not closed".to_string(),
                    ));
                }
                _ => (),
            }
        };

        Ok(Self {
            status,
            error,
            payload: body[payload_start..payload_end].to_string(),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status == STAT_OK
    }
}

/// Reduces a transport outcome and an optional envelope to a single result.
///
/// A structured error in the envelope always wins, even over a transport error. Otherwise the
/// transport error is passed through unchanged.
pub fn classify(
    transport: Result<(), FlickrError>,
    envelope: Option<&Envelope>,
) -> Result<(), FlickrError> {
    let reported = envelope
        .and_then(|e| e.error.as_ref())
        .filter(|err| !(err.code.is_empty() && err.message.is_empty()));
    if let Some(err) = reported {
        return Err(FlickrError::ApiResponse {
            code: err.code.clone(),
            message: err.message.clone(),
        });
    }
    transport
}

/// Turns a classified response into its payload, rejecting envelopes that failed without saying
/// why.
pub(crate) fn into_payload(envelope: Envelope) -> Result<String, FlickrError> {
    if !envelope.is_ok() {
        return Err(FlickrError::ApiResponseMalformed(format!(
            "status '{}' without an error element",
            envelope.status
        )));
    }
    Ok(envelope.payload)
}

// Upload payloads are a single element wrapping the id, e.g. <photoid>1234</photoid>
#[derive(Deserialize)]
struct PhotoIdPayload {
    #[serde(rename = "$text")]
    id: String,
}

/// Extracts the photo id from an upload/replace payload
pub fn photo_id(payload: &str) -> Result<String, FlickrError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(FlickrError::ResponseMissing());
    }
    let photo: PhotoIdPayload = quick_xml::de::from_str(payload)?;
    Ok(photo.id.trim().to_string())
}

fn api_error(e: &BytesStart<'_>) -> Result<ApiError, FlickrError> {
    Ok(ApiError {
        code: attribute(e, b"code")?.unwrap_or_default(),
        message: attribute(e, b"msg")?.unwrap_or_default(),
    })
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, FlickrError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    const OK_SETS: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<rsp stat="ok">
<photosets pages="1"><photoset id="721"><title>Trip</title></photoset></photosets>
</rsp>
"#;

    #[test]
    fn parses_ok_envelope_payload() {
        let env = Envelope::parse(OK_SETS).unwrap();
        assert!(env.is_ok());
        assert!(env.error.is_none());
        assert_eq!(
            env.payload.trim(),
            r#"<photosets pages="1"><photoset id="721"><title>Trip</title></photoset></photosets>"#
        );
    }

    #[test]
    fn parses_error_envelope() {
        let env = Envelope::parse(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<rsp stat="fail">
	<err code="96" msg="Invalid signature &amp; stuff" />
</rsp>"#,
        )
        .unwrap();
        assert_eq!(env.status, "fail");
        assert_eq!(
            env.error,
            Some(ApiError {
                code: "96".to_string(),
                message: "Invalid signature & stuff".to_string(),
            })
        );
    }

    #[test]
    fn nested_err_elements_are_payload() {
        let env =
            Envelope::parse(r#"<rsp stat="ok"><log><err code="1" msg="x"/></log></rsp>"#).unwrap();
        assert!(env.error.is_none());
        assert_eq!(env.payload, r#"<log><err code="1" msg="x"/></log>"#);
    }

    #[test]
    fn empty_root_has_empty_payload() {
        let env = Envelope::parse(r#"<rsp stat="ok"/>"#).unwrap();
        assert!(env.is_ok());
        assert_eq!(env.payload, "");
    }

    #[test]
    fn malformed_bodies_are_errors() {
        assert!(Envelope::parse("").is_err());
        assert!(Envelope::parse("<html><body>502 Bad Gateway").is_err());
        assert!(Envelope::parse(r#"<rsp stat="ok"><a></b></rsp>"#).is_err());
    }

    #[test]
    fn envelope_error_wins_over_transport_error() {
        let env = Envelope::parse(
            r#"<rsp stat="fail"><err code="105" msg="Service currently unavailable"/></rsp>"#,
        )
        .unwrap();
        let transport = Err(FlickrError::Io(io::Error::other("reset")));
        let err = classify(transport, Some(&env)).unwrap_err();
        assert_eq!(err.to_string(), "105: Service currently unavailable");

        let err = classify(Ok(()), Some(&env)).unwrap_err();
        assert_eq!(err.api_code(), Some("105"));
    }

    #[test]
    fn transport_error_passes_through_without_envelope() {
        let transport = Err(FlickrError::Io(io::Error::other("connection refused")));
        match classify(transport, None) {
            Err(FlickrError::Io(e)) => assert_eq!(e.to_string(), "connection refused"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn no_errors_is_success() {
        let env = Envelope::parse(OK_SETS).unwrap();
        assert!(classify(Ok(()), Some(&env)).is_ok());
        assert!(classify(Ok(()), None).is_ok());
    }

    #[test]
    fn blank_err_element_does_not_count() {
        let env = Envelope::parse(r#"<rsp stat="ok"><err/></rsp>"#).unwrap();
        assert!(classify(Ok(()), Some(&env)).is_ok());
    }

    #[test]
    fn failed_status_without_error_is_malformed() {
        let env = Envelope::parse(r#"<rsp stat="fail"></rsp>"#).unwrap();
        assert!(matches!(
            into_payload(env),
            Err(FlickrError::ApiResponseMalformed(_))
        ));
    }

    #[test]
    fn photo_id_unwraps_payload() {
        assert_eq!(photo_id("\n<photoid>40936585950</photoid>\n").unwrap(), "40936585950");
        assert_eq!(
            photo_id(r#"<photoid secret="abc" originalsecret="def">123</photoid>"#).unwrap(),
            "123"
        );
        assert!(matches!(photo_id("  "), Err(FlickrError::ResponseMissing())));
    }
}
