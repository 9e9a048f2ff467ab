// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! User decryption of ciphertext handles through the FHE relayer.
//!
//! Every request generates a fresh ephemeral keypair and a fresh wallet signature over an
//! EIP-712 authorization. Neither is cached or reused across requests.

use alloy::{
    primitives::{Address, Bytes, U256},
    signers::{local::PrivateKeySigner, Signer},
    sol_types::{Eip712Domain, SolStruct},
};
use async_trait::async_trait;
use clap::Args;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{now_timestamp, record::CiphertextHandle};

/// Name of the EIP-712 domain the relayer verifies user decryption signatures against.
const EIP712_DOMAIN_NAME: &str = "Decryption";
const EIP712_DOMAIN_VERSION: &str = "1";

alloy::sol! {
    /// EIP-712 payload authorizing the holder of `publicKey` to decrypt values of the listed
    /// contracts during the validity window.
    #[derive(Debug)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 startTimestamp;
        uint256 durationDays;
    }
}

#[derive(Error, Debug)]
pub enum DecryptError {
    #[error("ciphertext handle is zero and cannot be decrypted")]
    ZeroHandle,

    #[error("failed to sign decryption authorization: {0}")]
    Signature(#[from] alloy::signers::Error),

    #[error("relayer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relayer returned an error: {0}")]
    Relayer(String),

    #[error("malformed relayer response: {0}")]
    MalformedResponse(String),
}

/// Capability turning a ciphertext handle into its cleartext value.
///
/// This is the only path from a handle to a number; nothing in this crate decrypts locally.
#[async_trait]
pub trait Decryptor: Send + Sync {
    async fn user_decrypt(
        &self,
        handle: CiphertextHandle,
        contract_address: Address,
    ) -> Result<u64, DecryptError>;
}

/// Settings for reaching the FHE relayer.
#[non_exhaustive]
#[derive(Args, Clone, Debug)]
pub struct RelayerConfig {
    /// URL of the FHE relayer.
    #[clap(long, env)]
    pub relayer_url: Url,

    /// Address of the decryption verifier contract used as the EIP-712 verifying contract.
    #[clap(long, env)]
    pub decryption_verifier_address: Address,

    /// Chain ID of the FHE gateway chain, used in the EIP-712 domain.
    #[clap(long, env)]
    pub gateway_chain_id: u64,

    /// Number of days a decryption authorization remains valid.
    #[clap(long, env, default_value_t = 10)]
    pub authorization_days: u64,
}

impl RelayerConfig {
    pub fn new(relayer_url: Url, decryption_verifier_address: Address, gateway_chain_id: u64) -> Self {
        Self { relayer_url, decryption_verifier_address, gateway_chain_id, authorization_days: 10 }
    }

    fn domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(EIP712_DOMAIN_NAME.into()),
            Some(EIP712_DOMAIN_VERSION.into()),
            Some(U256::from(self.gateway_chain_id)),
            Some(self.decryption_verifier_address),
            None,
        )
    }
}

/// Keypair generated for exactly one decryption request.
pub struct EphemeralKeypair {
    signer: PrivateKeySigner,
}

impl EphemeralKeypair {
    pub fn generate() -> Self {
        Self { signer: PrivateKeySigner::random() }
    }

    /// Uncompressed SEC1 encoding of the public key.
    pub fn public_key(&self) -> Bytes {
        let point = self.signer.credential().verifying_key().to_encoded_point(false);
        Bytes::copy_from_slice(point.as_bytes())
    }
}

/// Signed, time-boxed permission for one decryption request.
#[derive(Clone, Debug)]
pub struct DecryptAuthorization {
    pub public_key: Bytes,
    pub contract_addresses: Vec<Address>,
    pub start_timestamp: u64,
    pub duration_days: u64,
    pub signature: Bytes,
}

impl DecryptAuthorization {
    /// Sign a new authorization for `keypair` with the user's wallet.
    pub async fn sign(
        signer: &(impl Signer + Sync),
        config: &RelayerConfig,
        keypair: &EphemeralKeypair,
        contract_addresses: Vec<Address>,
        start_timestamp: u64,
    ) -> Result<Self, DecryptError> {
        let public_key = keypair.public_key();
        let payload = UserDecryptRequestVerification {
            publicKey: public_key.clone(),
            contractAddresses: contract_addresses.clone(),
            startTimestamp: U256::from(start_timestamp),
            durationDays: U256::from(config.authorization_days),
        };
        let hash = payload.eip712_signing_hash(&config.domain());
        let signature = signer.sign_hash(&hash).await?;
        Ok(Self {
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days: config.authorization_days,
            signature: Bytes::copy_from_slice(&signature.as_bytes()),
        })
    }

    /// Whether the authorization window covers `timestamp`.
    pub fn is_valid_at(&self, timestamp: u64) -> bool {
        let end = self.start_timestamp.saturating_add(self.duration_days.saturating_mul(86_400));
        self.start_timestamp <= timestamp && timestamp < end
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HandleContractPair {
    handle: String,
    contract_address: Address,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RequestValidity {
    start_timestamp: String,
    duration_days: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UserDecryptRequest {
    handle_contract_pairs: Vec<HandleContractPair>,
    request_validity: RequestValidity,
    contracts_chain_id: String,
    contract_addresses: Vec<Address>,
    user_address: Address,
    signature: String,
    public_key: String,
}

#[derive(Deserialize, Debug)]
struct UserDecryptResponse {
    #[serde(default)]
    response: Vec<DecryptedValue>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct DecryptedValue {
    handle: String,
    value: String,
}

/// [Decryptor] that asks the FHE relayer to decrypt on behalf of the signer's account.
pub struct RelayerDecryptor<S> {
    client: reqwest::Client,
    config: RelayerConfig,
    signer: S,
    chain_id: u64,
}

impl<S: Signer + Send + Sync> RelayerDecryptor<S> {
    /// `chain_id` is the chain the ciphertext handles live on.
    pub fn new(config: RelayerConfig, signer: S, chain_id: u64) -> Self {
        Self { client: reqwest::Client::new(), config, signer, chain_id }
    }

    /// The user decryption endpoint, resolved below the full path of the relayer URL.
    fn endpoint(&self) -> Result<Url, DecryptError> {
        let mut base = self.config.relayer_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("v1/user-decrypt")
            .map_err(|e| DecryptError::Relayer(format!("invalid relayer URL: {e}")))
    }
}

#[async_trait]
impl<S: Signer + Send + Sync> Decryptor for RelayerDecryptor<S> {
    async fn user_decrypt(
        &self,
        handle: CiphertextHandle,
        contract_address: Address,
    ) -> Result<u64, DecryptError> {
        if handle.is_zero() {
            return Err(DecryptError::ZeroHandle);
        }

        let keypair = EphemeralKeypair::generate();
        let authorization = DecryptAuthorization::sign(
            &self.signer,
            &self.config,
            &keypair,
            vec![contract_address],
            now_timestamp(),
        )
        .await?;

        let request = UserDecryptRequest {
            handle_contract_pairs: vec![HandleContractPair {
                handle: handle.to_string(),
                contract_address,
            }],
            request_validity: RequestValidity {
                start_timestamp: authorization.start_timestamp.to_string(),
                duration_days: authorization.duration_days.to_string(),
            },
            contracts_chain_id: self.chain_id.to_string(),
            contract_addresses: authorization.contract_addresses.clone(),
            user_address: self.signer.address(),
            signature: hex::encode(&authorization.signature),
            public_key: hex::encode(&authorization.public_key),
        };

        let endpoint = self.endpoint()?;
        tracing::debug!(%handle, %contract_address, %endpoint, "Sending user decryption request");
        let response = self.client.post(endpoint).json(&request).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str::<UserDecryptResponse>(&text);
        if !status.is_success() {
            let detail = match body {
                Ok(UserDecryptResponse { error: Some(error), .. }) => error,
                _ => text.chars().take(200).collect(),
            };
            return Err(DecryptError::Relayer(format!("status {status}: {detail}")));
        }
        let body = body.map_err(|e| DecryptError::MalformedResponse(e.to_string()))?;
        parse_decrypted_value(handle, body)
    }
}

fn parse_decrypted_value(
    handle: CiphertextHandle,
    body: UserDecryptResponse,
) -> Result<u64, DecryptError> {
    if let Some(error) = body.error {
        return Err(DecryptError::Relayer(error));
    }
    let expected = handle.to_string();
    let entry = body
        .response
        .into_iter()
        .find(|entry| entry.handle.eq_ignore_ascii_case(&expected))
        .ok_or_else(|| {
            DecryptError::MalformedResponse(format!("no value returned for handle {expected}"))
        })?;
    entry.value.parse::<u64>().map_err(|e| {
        DecryptError::MalformedResponse(format!("value {:?} is not a u64: {e}", entry.value))
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::B256;
    use httpmock::prelude::*;

    use super::*;

    fn config() -> RelayerConfig {
        RelayerConfig::new(
            Url::parse("https://relayer.example.org/").unwrap(),
            Address::repeat_byte(0x42),
            55_815,
        )
    }

    fn response(json: serde_json::Value) -> UserDecryptResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_fresh_keypair_per_request() {
        let a = EphemeralKeypair::generate();
        let b = EphemeralKeypair::generate();
        assert_eq!(a.public_key().len(), 65);
        assert_ne!(a.public_key(), b.public_key());
    }

    #[tokio::test]
    async fn test_authorization_recovers_to_signer() {
        let wallet = PrivateKeySigner::random();
        let config = config();
        let keypair = EphemeralKeypair::generate();
        let contract = Address::repeat_byte(7);
        let auth = DecryptAuthorization::sign(&wallet, &config, &keypair, vec![contract], 1_000)
            .await
            .unwrap();

        let payload = UserDecryptRequestVerification {
            publicKey: auth.public_key.clone(),
            contractAddresses: vec![contract],
            startTimestamp: U256::from(1_000),
            durationDays: U256::from(10),
        };
        let hash = payload.eip712_signing_hash(&config.domain());
        let signature = alloy::primitives::Signature::try_from(auth.signature.as_ref()).unwrap();
        assert_eq!(signature.recover_address_from_prehash(&hash).unwrap(), wallet.address());
    }

    #[tokio::test]
    async fn test_authorization_is_not_reused() {
        let wallet = PrivateKeySigner::random();
        let config = config();
        let contract = Address::repeat_byte(7);
        let first = DecryptAuthorization::sign(
            &wallet,
            &config,
            &EphemeralKeypair::generate(),
            vec![contract],
            1_000,
        )
        .await
        .unwrap();
        let second = DecryptAuthorization::sign(
            &wallet,
            &config,
            &EphemeralKeypair::generate(),
            vec![contract],
            1_000,
        )
        .await
        .unwrap();
        assert_ne!(first.public_key, second.public_key);
        assert_ne!(first.signature, second.signature);
    }

    #[test]
    fn test_authorization_window() {
        let auth = DecryptAuthorization {
            public_key: Bytes::new(),
            contract_addresses: vec![],
            start_timestamp: 1_000,
            duration_days: 1,
            signature: Bytes::new(),
        };
        assert!(!auth.is_valid_at(999));
        assert!(auth.is_valid_at(1_000));
        assert!(auth.is_valid_at(1_000 + 86_399));
        assert!(!auth.is_valid_at(1_000 + 86_400));
    }

    #[tokio::test]
    async fn test_zero_handle_rejected_without_request() {
        let decryptor = RelayerDecryptor::new(config(), PrivateKeySigner::random(), 11_155_111);
        let err = decryptor
            .user_decrypt(CiphertextHandle::ZERO, Address::repeat_byte(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DecryptError::ZeroHandle));
    }

    #[test]
    fn test_parse_decrypted_value() {
        let handle = CiphertextHandle(B256::repeat_byte(0xab));
        let body = response(serde_json::json!({
            "response": [
                { "handle": format!("{}", B256::repeat_byte(0xcd)), "value": "1" },
                { "handle": handle.to_string().to_uppercase().replace("0X", "0x"), "value": "10000000000" },
            ]
        }));
        assert_eq!(parse_decrypted_value(handle, body).unwrap(), 10_000_000_000);
    }

    #[test]
    fn test_parse_decrypted_value_errors() {
        let handle = CiphertextHandle(B256::repeat_byte(0xab));

        let missing = response(serde_json::json!({ "response": [] }));
        assert!(matches!(
            parse_decrypted_value(handle, missing),
            Err(DecryptError::MalformedResponse(_))
        ));

        let not_a_number = response(serde_json::json!({
            "response": [{ "handle": handle.to_string(), "value": "-5" }]
        }));
        assert!(matches!(
            parse_decrypted_value(handle, not_a_number),
            Err(DecryptError::MalformedResponse(_))
        ));

        let relayer_error = response(serde_json::json!({ "error": "user not allowed" }));
        match parse_decrypted_value(handle, relayer_error) {
            Err(DecryptError::Relayer(msg)) => assert_eq!(msg, "user not allowed"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    fn relayer_at(server: &MockServer) -> RelayerDecryptor<PrivateKeySigner> {
        let config = RelayerConfig::new(
            Url::parse(&server.base_url()).unwrap(),
            Address::repeat_byte(0x42),
            55_815,
        );
        RelayerDecryptor::new(config, PrivateKeySigner::random(), 11_155_111)
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let signer = PrivateKeySigner::random();
        let with_path = RelayerDecryptor::new(
            RelayerConfig::new(
                Url::parse("https://relayer.example.org/api").unwrap(),
                Address::ZERO,
                1,
            ),
            signer.clone(),
            1,
        );
        assert_eq!(
            with_path.endpoint().unwrap().as_str(),
            "https://relayer.example.org/api/v1/user-decrypt"
        );

        let root = RelayerDecryptor::new(config(), signer, 1);
        assert_eq!(root.endpoint().unwrap().as_str(), "https://relayer.example.org/v1/user-decrypt");
    }

    #[tokio::test]
    async fn test_user_decrypt_over_http() {
        let server = MockServer::start_async().await;
        let handle = CiphertextHandle(B256::repeat_byte(0xab));
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/user-decrypt")
                    .body_contains(r#""contractsChainId":"11155111""#)
                    .body_contains(r#""durationDays":"10""#)
                    .body_contains(handle.to_string().as_str())
                    .body_contains(r#""publicKey":"04"#);
                then.status(200).json_body(serde_json::json!({
                    "response": [{ "handle": handle.to_string(), "value": "10000000000" }]
                }));
            })
            .await;

        let value = relayer_at(&server).user_decrypt(handle, Address::repeat_byte(7)).await.unwrap();
        assert_eq!(value, 10_000_000_000);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_user_decrypt_client_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/user-decrypt");
                then.status(403).json_body(serde_json::json!({ "error": "user not allowed" }));
            })
            .await;

        let err = relayer_at(&server)
            .user_decrypt(CiphertextHandle(B256::repeat_byte(0xab)), Address::repeat_byte(7))
            .await
            .unwrap_err();
        match err {
            DecryptError::Relayer(msg) => {
                assert!(msg.contains("403"), "{msg}");
                assert!(msg.contains("user not allowed"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_user_decrypt_server_error_with_html_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/user-decrypt");
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;

        let err = relayer_at(&server)
            .user_decrypt(CiphertextHandle(B256::repeat_byte(0xab)), Address::repeat_byte(7))
            .await
            .unwrap_err();
        match err {
            DecryptError::Relayer(msg) => {
                assert!(msg.contains("502"), "{msg}");
                assert!(msg.contains("Bad Gateway"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_user_decrypt_rejects_non_json_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/user-decrypt");
                then.status(200).body("ok");
            })
            .await;

        let err = relayer_at(&server)
            .user_decrypt(CiphertextHandle(B256::repeat_byte(0xab)), Address::repeat_byte(7))
            .await
            .unwrap_err();
        assert!(matches!(err, DecryptError::MalformedResponse(_)), "{err:?}");
    }
}
