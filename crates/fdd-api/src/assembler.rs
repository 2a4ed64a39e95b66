//! Request assembly.
//!
//! Turns an [`Endpoint`] descriptor plus the caller's [`BusinessParams`] into
//! a [`SignedRequest`]:
//!
//! 1. validate the fields against the descriptor and fill defaults,
//! 2. resolve file-backed values (images → base64, uploads → multipart),
//! 3. compute the digest selected by the endpoint's [`Signing`],
//! 4. prepend the common parameters (`app_id`, `timestamp`, `v`, `msg_digest`).
//!
//! The result is either dispatched through a transport or rendered as a
//! redirect URL, depending on the endpoint's [`Delivery`].

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use fdd_core::error::FddError;
use fdd_core::{BusinessParams, Credentials, ParamValue, Timestamp, is_common_field};
use tracing::debug;

use crate::auth::{DigestGenerator, SortMode, canonicalize, template_fill_canonical};
use crate::endpoint::{Delivery, Endpoint, FieldKind, Presence, Signing};
use crate::transport::WireValue;

/// A fully signed request: common fields first, then business fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub endpoint: &'static Endpoint,
    /// `<base_url><path>.api`
    pub url: String,
    pub fields: Vec<(String, WireValue)>,
}

impl SignedRequest {
    pub fn delivery(&self) -> Delivery {
        self.endpoint.delivery
    }

    /// Text value of a field, if present and not a file.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.as_text())
    }

    /// All text fields in wire order; file parts are skipped.
    pub fn text_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.as_text().map(|t| (k.as_str(), t)))
    }

    /// The attached `msg_digest`.
    pub fn digest(&self) -> Option<&str> {
        self.text_field("msg_digest")
    }

    /// Fields other than the common parameters.
    pub fn business_fields(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.fields
            .iter()
            .filter(|(k, _)| !is_common_field(k))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// The URL with every text field form-urlencoded into the query string.
    pub fn redirect_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.text_fields())
            .finish();
        format!("{}?{}", self.url, query)
    }
}

/// Builds signed requests for one client identity and timestamp.
#[derive(Debug, Clone, Copy)]
pub struct RequestAssembler<'a> {
    credentials: &'a Credentials,
    timestamp: &'a Timestamp,
    version: &'a str,
    base_url: &'a str,
}

impl<'a> RequestAssembler<'a> {
    pub fn new(
        credentials: &'a Credentials,
        timestamp: &'a Timestamp,
        version: &'a str,
        base_url: &'a str,
    ) -> Self {
        Self {
            credentials,
            timestamp,
            version,
            base_url,
        }
    }

    /// Validate, resolve and sign `params` for `endpoint`.
    pub fn assemble(
        &self,
        endpoint: &'static Endpoint,
        params: BusinessParams,
    ) -> Result<SignedRequest, FddError> {
        let business = resolve_fields(endpoint, params)?;
        let msg_digest = self.digest_for(endpoint, &business)?;
        debug!(
            endpoint = endpoint.name,
            scheme = endpoint.scheme().as_str(),
            fields = business.len(),
            "assembled signed request"
        );

        let mut fields = vec![
            ("app_id".to_owned(), WireValue::Text(self.credentials.app_id().to_owned())),
            ("timestamp".to_owned(), WireValue::Text(self.timestamp.as_str().to_owned())),
            ("v".to_owned(), WireValue::Text(self.version.to_owned())),
            ("msg_digest".to_owned(), WireValue::Text(msg_digest)),
        ];
        fields.extend(business);

        Ok(SignedRequest {
            endpoint,
            url: format!("{}{}", self.base_url, endpoint.wire_path()),
            fields,
        })
    }

    fn digest_for(
        &self,
        endpoint: &'static Endpoint,
        business: &[(String, WireValue)],
    ) -> Result<String, FddError> {
        let generator = DigestGenerator::new(self.credentials);
        let text = |name: &str| {
            business
                .iter()
                .find(|(k, _)| k == name)
                .and_then(|(_, v)| v.as_text())
                .ok_or_else(|| FddError::MissingField {
                    endpoint: endpoint.name,
                    field: name.to_owned(),
                })
        };

        let digest = match endpoint.signing {
            Signing::Sorted => {
                let canonical = canonicalize(text_pairs(business, |_| true), SortMode::Regular);
                generator.standard(self.timestamp, &canonical)
            }
            Signing::Only(signed) => {
                let canonical = canonicalize(
                    text_pairs(business, |k| signed.iter().any(|s| *s == k)),
                    SortMode::Regular,
                );
                generator.standard(self.timestamp, &canonical)
            }
            Signing::TemplateFill => {
                let canonical = template_fill_canonical(text("template_id")?, text("contract_id")?);
                generator.standard(self.timestamp, &canonical)
            }
            Signing::TransactionBound => generator.transaction_bound(
                self.timestamp,
                text("transaction_id")?,
                text("customer_id")?,
            ),
        };
        Ok(digest)
    }
}

/// Base64 of a local file's bytes.
pub fn encode_image(path: &Path) -> Result<String, FddError> {
    let not_found = || FddError::ResourceNotFound {
        path: path.to_path_buf(),
    };
    if !path.is_file() {
        return Err(not_found());
    }
    let bytes = std::fs::read(path).map_err(|_| not_found())?;
    Ok(BASE64.encode(bytes))
}

fn text_pairs<'b>(
    business: &'b [(String, WireValue)],
    keep: impl Fn(&str) -> bool,
) -> Vec<(&'b str, &'b str)> {
    business
        .iter()
        .filter(|(k, _)| keep(k))
        .filter_map(|(k, v)| v.as_text().map(|t| (k.as_str(), t)))
        .collect()
}

/// Check `params` against the descriptor and produce wire values: declared
/// fields in declaration order, then extras in key order.
fn resolve_fields(
    endpoint: &'static Endpoint,
    mut params: BusinessParams,
) -> Result<Vec<(String, WireValue)>, FddError> {
    for (name, _) in params.iter() {
        if is_common_field(name) {
            return Err(FddError::ReservedField(name.to_owned()));
        }
        if !endpoint.accepts_extra && endpoint.field(name).is_none() {
            return Err(FddError::UnexpectedField {
                endpoint: endpoint.name,
                field: name.to_owned(),
            });
        }
    }

    let mut resolved = Vec::with_capacity(endpoint.fields.len() + params.len());
    for field in endpoint.fields {
        let value = match (params.remove(field.name), field.presence) {
            (Some(value), _) => value,
            (None, Presence::Default(default)) => ParamValue::Text(default.to_owned()),
            (None, Presence::Optional) => continue,
            (None, Presence::Required) => {
                return Err(FddError::MissingField {
                    endpoint: endpoint.name,
                    field: field.name.to_owned(),
                });
            }
        };
        resolved.push((field.name.to_owned(), resolve_value(field.name, field.kind, value)?));
    }

    for (name, value) in params {
        let wire = resolve_value(&name, FieldKind::Scalar, value)?;
        resolved.push((name, wire));
    }
    Ok(resolved)
}

/// Text values of image / upload fields are local paths.
fn resolve_value(name: &str, kind: FieldKind, value: ParamValue) -> Result<WireValue, FddError> {
    match (kind, value) {
        (_, ParamValue::Image(path)) => Ok(WireValue::Text(encode_image(&path)?)),
        (FieldKind::Image, ParamValue::Text(path)) => {
            Ok(WireValue::Text(encode_image(Path::new(&path))?))
        }
        (_, ParamValue::File(path)) => upload(path.into()),
        (FieldKind::Multipart, ParamValue::Text(path)) => upload(path.into()),
        (FieldKind::Scalar, ParamValue::Text(text)) => Ok(WireValue::Text(text)),
        (FieldKind::Scalar, ParamValue::Int(n)) => Ok(WireValue::Text(n.to_string())),
        (FieldKind::Image | FieldKind::Multipart, ParamValue::Int(_)) => Err(FddError::Parse(
            format!("field '{name}' expects a file path, got an integer"),
        )),
    }
}

fn upload(path: std::path::PathBuf) -> Result<WireValue, FddError> {
    if path.is_file() {
        Ok(WireValue::File(path))
    } else {
        Err(FddError::ResourceNotFound { path })
    }
}
