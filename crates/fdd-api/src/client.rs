//! FDD API client.
//!
//! [`FddClient`] owns the credentials, the outbound timestamp (captured once
//! at construction), and a [`Transport`]. Every endpoint goes through the
//! same path: look up its descriptor, assemble and sign, then either dispatch
//! or render a redirect URL.
//!
//! All methods take `&self` and the client holds no mutable state, so one
//! instance can sign and verify from many tasks at once. Verification uses
//! the timestamp declared by the inbound payload; it never touches the
//! client's own.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fdd_core::config::FddConfig;
use fdd_core::error::FddError;
use fdd_core::{BusinessParams, Credentials, Timestamp};
use serde_json::{Map, Value};
use tracing::info;

use crate::assembler::{self, RequestAssembler, SignedRequest};
use crate::auth::{CipherOutcome, SignatureVerifier, cipher};
use crate::endpoint::{Delivery, Endpoint};
use crate::transport::{HttpTransport, Transport};

/// Signed client for the FDD e-contract API.
pub struct FddClient {
    credentials: Credentials,
    timestamp: Timestamp,
    version: String,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl FddClient {
    /// Build a client with the HTTP transport.
    ///
    /// Fails with [`FddError::Config`] when credentials are missing.
    pub fn new(config: &FddConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport))?)
    }

    /// Build a client around any transport.
    pub fn with_transport(config: &FddConfig, transport: Arc<dyn Transport>) -> Result<Self, FddError> {
        let credentials = config.credentials()?;
        Ok(Self {
            credentials,
            timestamp: Timestamp::now(),
            version: config.version.clone(),
            base_url: config.base_url.clone(),
            transport,
        })
    }

    /// Replace the outbound timestamp.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Timestamp attached to outbound requests.
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn assembler(&self) -> RequestAssembler<'_> {
        RequestAssembler::new(&self.credentials, &self.timestamp, &self.version, &self.base_url)
    }

    pub fn verifier(&self) -> SignatureVerifier<'_> {
        SignatureVerifier::new(&self.credentials)
    }

    /// Assemble and sign a request without sending it.
    pub fn sign(&self, endpoint: &str, params: BusinessParams) -> Result<SignedRequest, FddError> {
        self.assembler().assemble(Endpoint::lookup(endpoint)?, params)
    }

    /// Signed URL for a redirect endpoint (view, download, manual signing,
    /// pre-authorization). Nothing is sent.
    pub fn redirect_url(&self, endpoint: &str, params: BusinessParams) -> Result<String, FddError> {
        let request = self.sign(endpoint, params)?;
        if request.delivery() != Delivery::Redirect {
            return Err(wrong_delivery(request.endpoint, Delivery::Redirect));
        }
        Ok(request.redirect_url())
    }

    /// Sign and dispatch a POST / GET endpoint, returning the decoded response.
    pub async fn call(&self, endpoint: &str, params: BusinessParams) -> Result<Value> {
        let request = self.sign(endpoint, params)?;
        self.dispatch(&request).await
    }

    /// Dispatch an already signed request.
    pub async fn dispatch(&self, request: &SignedRequest) -> Result<Value> {
        let Some(method) = request.delivery().http_method() else {
            return Err(wrong_delivery(request.endpoint, Delivery::Post).into());
        };
        info!(endpoint = request.endpoint.name, method = method.as_str(), url = %request.url, "dispatching");
        self.transport
            .send(method, &request.url, &request.fields)
            .await
            .with_context(|| format!("endpoint '{}' failed", request.endpoint.name))
    }

    /// Three-element (name, ID card, mobile) identity check.
    ///
    /// The triple is encrypted with the shared secret; a cipher failure stops
    /// the call with [`FddError::Cipher`].
    pub async fn three_element_verify_mobile(&self, name: &str, id_card: &str, mobile: &str) -> Result<Value> {
        let verify_element =
            match cipher::encrypt_three_elements(name, id_card, mobile, self.credentials.app_secret()) {
                CipherOutcome::Encrypted(hex) => hex,
                CipherOutcome::Failed(message) => return Err(FddError::Cipher(message).into()),
            };
        self.call(
            "three_element_verify_mobile",
            BusinessParams::new().with("verify_element", verify_element),
        )
        .await
    }

    /// Base64 of a local image, as sent in image fields.
    pub fn encode_image(&self, path: &Path) -> Result<String, FddError> {
        assembler::encode_image(path)
    }

    /// Verify a response or notification carrying `sign`.
    pub fn verify_inbound_signature(&self, payload: &Map<String, Value>) -> bool {
        self.verifier().verify_inbound_signature(payload)
    }

    /// Verify a contract-signing callback carrying `msg_digest`.
    pub fn verify_callback_signature(&self, payload: &Map<String, Value>) -> bool {
        self.verifier().verify_callback_signature(payload)
    }
}

fn wrong_delivery(endpoint: &'static Endpoint, requested: Delivery) -> FddError {
    FddError::WrongDelivery {
        endpoint: endpoint.name,
        actual: endpoint.delivery.as_str(),
        requested: match requested {
            Delivery::Redirect => "a redirect URL",
            Delivery::Post | Delivery::Get => "a dispatched request",
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::transport::{HttpMethod, WireValue};

    type Sent = (HttpMethod, String, Vec<(String, WireValue)>);

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Sent>>,
    }

    impl RecordingTransport {
        fn last(&self) -> Sent {
            self.sent.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, method: HttpMethod, url: &str, fields: &[(String, WireValue)]) -> Result<Value> {
            self.sent
                .lock()
                .unwrap()
                .push((method, url.to_owned(), fields.to_vec()));
            Ok(json!({"code": 1, "msg": "success"}))
        }
    }

    const TS: &str = "20190627133700";

    fn config() -> FddConfig {
        let mut config = FddConfig::new("400123", "S3cr3tK3y");
        config.base_url = "https://api.example.com/api/".into();
        config
    }

    fn client() -> (FddClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let client = FddClient::with_transport(&config(), transport.clone())
            .unwrap()
            .with_timestamp(Timestamp::from_raw(TS));
        (client, transport)
    }

    fn field<'a>(fields: &'a [(String, WireValue)], name: &str) -> Option<&'a str> {
        fields.iter().find(|(k, _)| k == name).and_then(|(_, v)| v.as_text())
    }

    #[test]
    fn missing_credentials_block_construction() {
        let transport = Arc::new(RecordingTransport::default());
        let mut config = config();
        config.app_secret = None;
        assert!(matches!(
            FddClient::with_transport(&config, transport),
            Err(FddError::Config(_))
        ));
    }

    #[test]
    fn http_client_construction_reports_config_errors() {
        let err = FddClient::new(&FddConfig::default()).err().unwrap();
        assert!(matches!(err.downcast_ref::<FddError>(), Some(FddError::Config(_))));
    }

    #[test]
    fn construction_captures_a_well_formed_timestamp() {
        let transport = Arc::new(RecordingTransport::default());
        let client = FddClient::with_transport(&config(), transport).unwrap();
        assert!(client.timestamp().is_well_formed());
    }

    #[tokio::test]
    async fn call_dispatches_signed_fields() {
        let (client, transport) = client();
        let response = client
            .call("account_register", BusinessParams::new().with("open_id", "u1"))
            .await
            .unwrap();
        assert_eq!(response["code"], 1);

        let (method, url, fields) = transport.last();
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(url, "https://api.example.com/api/account_register.api");
        assert_eq!(field(&fields, "app_id"), Some("400123"));
        assert_eq!(field(&fields, "timestamp"), Some(TS));
        assert_eq!(
            field(&fields, "msg_digest"),
            Some("Mjc4RjA4MjRBNjI5RTdBQjc2NThGRDlCNEIxNENFNkVFRDk0RUY4NA==")
        );
    }

    #[tokio::test]
    async fn call_rejects_redirect_endpoints() {
        let (client, transport) = client();
        let err = client
            .call("view_contract", BusinessParams::new().with("contract_id", "CT1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FddError>(),
            Some(FddError::WrongDelivery { endpoint: "view_contract", .. })
        ));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn redirect_url_only_for_redirect_endpoints() {
        let (client, _) = client();
        let url = client
            .redirect_url(
                "ext_sign",
                BusinessParams::new()
                    .with("transaction_id", "T1")
                    .with("contract_id", "CT1")
                    .with("customer_id", "C1")
                    .with("doc_title", "Lease"),
            )
            .unwrap();
        assert!(url.starts_with("https://api.example.com/api/extsign.api?app_id=400123&"));
        assert!(url.contains("msg_digest=MDI5MkZGNUZBMUEwQUUwMTgxREU3REU0MkQ0NTBCMjlDREQwMTJFOA%3D%3D"));

        assert!(matches!(
            client.redirect_url("contract_status", BusinessParams::new().with("contract_id", "CT1")),
            Err(FddError::WrongDelivery { .. })
        ));
    }

    #[tokio::test]
    async fn three_element_flow_sends_encrypted_triple() {
        let (client, transport) = client();
        client
            .three_element_verify_mobile("张三", "110101199003071234", "13800138000")
            .await
            .unwrap();

        let (_, url, fields) = transport.last();
        assert!(url.ends_with("three_element_verify_mobile.api"));
        assert_eq!(
            field(&fields, "verify_element"),
            Some("AAB7987D09FADB63372D21A49AF9FB9A544AB13977944BA46FBEE4A22EA67255D18EFDEF8FD0C9FC")
        );
    }

    #[test]
    fn encode_image_reads_file_bytes() {
        let (client, _) = client();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seal.png");
        std::fs::write(&path, b"\x89PNG").unwrap();
        assert_eq!(client.encode_image(&path).unwrap(), "iVBORw==");
        assert!(matches!(
            client.encode_image(&dir.path().join("missing.png")),
            Err(FddError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn verification_never_touches_the_outbound_timestamp() {
        let (client, _) = client();
        let before = client
            .sign("contract_status", BusinessParams::new().with("contract_id", "CT1"))
            .unwrap();

        let callback = json!({
            "transaction_id": "T1",
            "timestamp": "20200101000000",
            "msg_digest": "irrelevant",
        });
        assert!(!client.verify_callback_signature(callback.as_object().unwrap()));

        let after = client
            .sign("contract_status", BusinessParams::new().with("contract_id", "CT1"))
            .unwrap();
        assert_eq!(client.timestamp().as_str(), TS);
        assert_eq!(before.digest(), after.digest());
    }

    #[test]
    fn concurrent_verification_and_signing() {
        let (client, _) = client();
        let callback = json!({
            "transaction_id": "T1",
            "timestamp": TS,
            "msg_digest": "NERFMEREMDQ0QjlCMzUyQUFBNzlFMDUwQTY4MTkxOEY4QjY1OEQ0MQ==",
        });
        let callback = callback.as_object().unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert!(client.verify_callback_signature(callback)));
                s.spawn(|| {
                    let request = client
                        .sign("get_file", BusinessParams::new().with("uuid", "U1"))
                        .unwrap();
                    assert_eq!(request.text_field("timestamp"), Some(TS));
                });
            }
        });
    }
}
