//! Endpoint catalogue.
//!
//! Each remote operation is described by a static [`Endpoint`] descriptor:
//! its wire path, how it is delivered (POST / GET dispatch or a redirect
//! URL), how its digest is computed, and which business fields it takes.
//! A single generic routine ([`RequestAssembler`](crate::RequestAssembler))
//! consumes these descriptors, so adding an endpoint is a table entry.
//!
//! | Signing            | Digest   | Canonical input                        |
//! |--------------------|----------|----------------------------------------|
//! | `Sorted`           | scheme A | all scalar business fields, key-sorted |
//! | `Only(fields)`     | scheme A | the listed fields, key-sorted          |
//! | `TemplateFill`     | scheme A | `template_id` · `contract_id`          |
//! | `TransactionBound` | scheme B | `transaction_id`, `customer_id`        |

use fdd_core::error::FddError;

use crate::auth::DigestScheme;
use crate::transport::HttpMethod;

/// How a signed request leaves the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Dispatched through the transport as a POST.
    Post,
    /// Dispatched through the transport as a GET.
    Get,
    /// Rendered as a URL for an end-user browser; nothing is sent.
    Redirect,
}

impl Delivery {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
            Self::Redirect => "URL",
        }
    }

    /// HTTP verb for dispatch modes, `None` for redirects.
    pub fn http_method(self) -> Option<HttpMethod> {
        match self {
            Self::Post => Some(HttpMethod::Post),
            Self::Get => Some(HttpMethod::Get),
            Self::Redirect => None,
        }
    }
}

/// Which fields feed the digest, and with which scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signing {
    Sorted,
    Only(&'static [&'static str]),
    TemplateFill,
    TransactionBound,
}

impl Signing {
    pub fn scheme(self) -> DigestScheme {
        match self {
            Self::TransactionBound => DigestScheme::TransactionBound,
            Self::Sorted | Self::Only(_) | Self::TemplateFill => DigestScheme::Standard,
        }
    }
}

/// How a field's value reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text or integer, sent as-is.
    Scalar,
    /// Local image path, sent (and signed) as base64 of the file bytes.
    Image,
    /// Local file path, sent as a binary multipart part.
    Multipart,
}

/// Whether a field must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Filled with this value when absent.
    Default(&'static str),
    /// Omitted when absent.
    Optional,
}

/// One business field of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

const fn req(name: &'static str) -> Field {
    Field {
        name,
        kind: FieldKind::Scalar,
        presence: Presence::Required,
    }
}

const fn def(name: &'static str, value: &'static str) -> Field {
    Field {
        name,
        kind: FieldKind::Scalar,
        presence: Presence::Default(value),
    }
}

const fn image(name: &'static str, presence: Presence) -> Field {
    Field {
        name,
        kind: FieldKind::Image,
        presence,
    }
}

const fn upload(name: &'static str) -> Field {
    Field {
        name,
        kind: FieldKind::Multipart,
        presence: Presence::Optional,
    }
}

/// Static description of one remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Stable identifier used by callers (`snake_case`).
    pub name: &'static str,
    /// Remote path without the `.api` suffix.
    pub path: &'static str,
    pub delivery: Delivery,
    pub signing: Signing,
    pub fields: &'static [Field],
    /// Accept (and sign) fields beyond `fields`.
    pub accepts_extra: bool,
}

impl Endpoint {
    /// Find an endpoint by name.
    pub fn lookup(name: &str) -> Result<&'static Endpoint, FddError> {
        ENDPOINTS
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| FddError::UnknownEndpoint(name.to_owned()))
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn scheme(&self) -> DigestScheme {
        self.signing.scheme()
    }

    /// Path with the `.api` suffix, relative to the base URL.
    pub fn wire_path(&self) -> String {
        format!("{}.api", self.path)
    }
}

const fn endpoint(
    name: &'static str,
    path: &'static str,
    delivery: Delivery,
    signing: Signing,
    fields: &'static [Field],
) -> Endpoint {
    Endpoint {
        name,
        path,
        delivery,
        signing,
        fields,
        accepts_extra: false,
    }
}

const fn with_extra(mut e: Endpoint) -> Endpoint {
    e.accepts_extra = true;
    e
}

use Delivery::{Get, Post, Redirect};
use Signing::{Only, Sorted, TemplateFill, TransactionBound};

/// Every operation the client knows about.
pub static ENDPOINTS: &[Endpoint] = &[
    // -- accounts and identity --
    endpoint("account_register", "account_register", Post, Sorted, &[
        req("open_id"),
        def("account_type", "1"),
    ]),
    with_extra(endpoint("get_company_verify_url", "get_company_verify_url", Post, Sorted, &[
        req("customer_id"),
        req("notify_url"),
        def("page_modify", "1"),
        def("company_principal_type", "1"),
    ])),
    with_extra(endpoint("get_person_verify_url", "get_person_verify_url", Post, Sorted, &[
        req("customer_id"),
        req("notify_url"),
        def("verified_way", "1"),
        def("page_modify", "1"),
        def("cert_flag", "1"),
        def("customer_ident_type", "0"),
    ])),
    endpoint("hash_deposit", "hash_deposit", Get, Sorted, &[
        req("customer_id"),
        req("transaction_id"),
        req("preservation_name"),
        req("file_name"),
        req("noper_time"),
        req("file_size"),
        req("original_sha25"),
        def("cert_flag", "0"),
    ]),
    endpoint("person_deposit", "person_deposit", Post, Sorted, &[
        req("customer_id"),
        req("name"),
        req("idcard"),
        req("mobile"),
        req("preservation_name"),
        req("preservation_data_provider"),
        req("mobile_essential_factor"),
        def("document_type", "0"),
        def("cert_flag", "1"),
        def("verified_type", "2"),
    ]),
    endpoint("three_element_verify_mobile", "three_element_verify_mobile", Post, Sorted, &[
        req("verify_element"),
    ]),
    endpoint("find_person_cert_info", "find_personCertInfo", Post, Sorted, &[
        req("verified_serialno"),
    ]),
    endpoint("company_deposit", "company_deposit", Post, Sorted, &[
        req("transaction_id"),
        req("company_customer_id"),
        req("company_preservation_name"),
        req("company_preservation_data_provider"),
        req("company_name"),
        req("credit_code"),
        req("company_principal_verifie_msg"),
        def("document_type", "1"),
        def("verified_mode", "1"),
        def("company_principal_type", "1"),
        image("credit_code_file", Presence::Optional),
        image("power_attorney_file", Presence::Optional),
    ]),
    endpoint("find_company_cert_info", "find_companyCertInfo", Post, Sorted, &[
        req("verified_serialno"),
    ]),
    endpoint("apply_client_numcert", "apply_client_numcert", Post, Sorted, &[
        req("customer_id"),
        req("evidence_no"),
    ]),
    endpoint("apply_cert", "apply_cert", Post, Sorted, &[
        req("customer_id"),
        req("verified_serialno"),
    ]),
    endpoint("apply_numcert", "apply_numcert", Post, Sorted, &[
        req("customer_id"),
        req("verified_serialno"),
    ]),
    endpoint("authorization", "authorization", Post, Sorted, &[
        req("companyId"),
        req("personId"),
        def("operateType", "1"),
    ]),
    // -- signatures (seals) --
    endpoint("add_signature", "add_signature", Post, Sorted, &[
        req("customer_id"),
        image("signature_img_base64", Presence::Required),
    ]),
    endpoint("custom_signature", "custom_signature", Post, Sorted, &[
        req("customer_id"),
        req("content"),
    ]),
    // -- documents and templates --
    endpoint("upload_docs", "uploaddocs", Post, Only(&["contract_id"]), &[
        req("contract_id"),
        req("doc_title"),
        def("doc_url", ""),
        upload("file"),
        def("doc_type", ".pdf"),
    ]),
    endpoint("upload_template", "uploadtemplate", Post, Only(&["template_id"]), &[
        req("template_id"),
        def("doc_url", ""),
        upload("file"),
        def("doc_type", ".pdf"),
    ]),
    endpoint("view_template", "view_template", Redirect, Sorted, &[req("template_id")]),
    endpoint("download_template", "download_template", Redirect, Sorted, &[req("template_id")]),
    endpoint("template_delete", "template_delete", Post, Sorted, &[req("template_id")]),
    endpoint("get_template_keys", "get_pdftemplate_keys", Post, Sorted, &[req("template_id")]),
    with_extra(endpoint("generate_contract", "generate_contract", Post, TemplateFill, &[
        req("doc_title"),
        req("template_id"),
        req("contract_id"),
        req("parameter_map"),
    ])),
    // -- signing --
    endpoint("ext_sign_auto", "extsign_auto", Post, TransactionBound, &[
        req("transaction_id"),
        req("contract_id"),
        req("customer_id"),
        def("client_role", "1"),
        def("doc_title", ""),
        def("position_type", "0"),
        def("sign_keyword", ""),
        def("keyword_strategy", "0"),
        def("notify_url", ""),
    ]),
    endpoint("ext_sign", "extsign", Redirect, TransactionBound, &[
        req("transaction_id"),
        req("contract_id"),
        req("customer_id"),
        req("doc_title"),
        def("return_url", ""),
        def("notify_url", ""),
        def("sign_keyword", ""),
    ]),
    endpoint("before_auth_sign", "before_authsign", Redirect, TransactionBound, &[
        req("transaction_id"),
        req("contract_id"),
        req("customer_id"),
        req("return_url"),
        def("notify_url", ""),
        def("auth_type", "1"),
    ]),
    // -- contracts --
    endpoint("view_contract", "viewContract", Redirect, Sorted, &[req("contract_id")]),
    endpoint("download_contract", "downLoadContract", Redirect, Sorted, &[req("contract_id")]),
    endpoint("contract_filing", "contractFiling", Post, Sorted, &[req("contract_id")]),
    endpoint("contract_status", "contract_status", Post, Sorted, &[req("contract_id")]),
    endpoint("get_file", "get_file", Post, Sorted, &[req("uuid")]),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_and_paths_are_unique() {
        let names: HashSet<_> = ENDPOINTS.iter().map(|e| e.name).collect();
        let paths: HashSet<_> = ENDPOINTS.iter().map(|e| e.path).collect();
        assert_eq!(names.len(), ENDPOINTS.len());
        assert_eq!(paths.len(), ENDPOINTS.len());
        assert_eq!(ENDPOINTS.len(), 30);
    }

    #[test]
    fn field_names_are_unique_and_never_common() {
        for e in ENDPOINTS {
            let names: HashSet<_> = e.fields.iter().map(|f| f.name).collect();
            assert_eq!(names.len(), e.fields.len(), "{}", e.name);
            assert!(
                e.fields.iter().all(|f| !fdd_core::is_common_field(f.name)),
                "{}",
                e.name
            );
        }
    }

    #[test]
    fn transaction_bound_endpoints_carry_both_identifiers() {
        let bound: Vec<_> = ENDPOINTS
            .iter()
            .filter(|e| e.scheme() == DigestScheme::TransactionBound)
            .map(|e| e.name)
            .collect();
        assert_eq!(bound, ["ext_sign_auto", "ext_sign", "before_auth_sign"]);

        for name in bound {
            let e = Endpoint::lookup(name).unwrap();
            for id in ["transaction_id", "customer_id"] {
                assert_eq!(e.field(id).map(|f| f.presence), Some(Presence::Required));
            }
        }
    }

    #[test]
    fn subset_signing_names_declared_fields() {
        for e in ENDPOINTS {
            if let Signing::Only(signed) = e.signing {
                assert!(signed.iter().all(|s| e.field(s).is_some()), "{}", e.name);
            }
        }
        let template_fill = Endpoint::lookup("generate_contract").unwrap();
        assert!(template_fill.field("template_id").is_some());
        assert!(template_fill.field("contract_id").is_some());
    }

    #[test]
    fn redirect_endpoints() {
        let redirects: Vec<_> = ENDPOINTS
            .iter()
            .filter(|e| e.delivery == Delivery::Redirect)
            .map(|e| e.name)
            .collect();
        assert_eq!(
            redirects,
            [
                "view_template",
                "download_template",
                "ext_sign",
                "before_auth_sign",
                "view_contract",
                "download_contract"
            ]
        );
        assert_eq!(Delivery::Redirect.http_method(), None);
    }

    #[test]
    fn lookup_unknown_is_an_error() {
        assert!(matches!(
            Endpoint::lookup("no_such_endpoint"),
            Err(FddError::UnknownEndpoint(name)) if name == "no_such_endpoint"
        ));
        assert_eq!(
            Endpoint::lookup("view_contract").unwrap().wire_path(),
            "viewContract.api"
        );
    }
}
