//! AWS Secrets Manager implementation of the `SeedStore` contract.
//! Seeds live in `SecretBinary`; `SecretString` is never written.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::{
    error::DisplayErrorContext,
    operation::{describe_secret::DescribeSecretOutput, get_secret_value::GetSecretValueOutput},
    primitives::Blob,
    Client,
};
use seedwarden_core::storage::{SeedStore, SeedStoreError};
use tracing::{debug, instrument};

/// Version stage label for the live version of a secret.
pub const CURRENT_STAGE: &str = "AWSCURRENT";

/// Version id for the first seed of every secret. Secrets Manager rejects a
/// second write under the same token with different content.
pub const INITIAL_VERSION_TOKEN: &str = "seedwarden-initial-seed-version-v1";

pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS environment (`AWS_PROFILE`,
    /// `AWS_REGION`, instance credentials, ...).
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl SeedStore for SecretsManagerStore {
    #[instrument(skip(self))]
    async fn fetch_current(&self, id: &str) -> Result<Option<Vec<u8>>, SeedStoreError> {
        let result = self
            .client
            .get_secret_value()
            .secret_id(id)
            .version_stage(CURRENT_STAGE)
            .send()
            .await;

        match result {
            Ok(output) => content_of(id, &output),
            // Also covers a secret that exists but has no AWSCURRENT version yet.
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(transport(id, &err)),
        }
    }

    /// `CreateSecret`, or `PutSecretValue` when the id is a placeholder with no
    /// current version. Both carry [`INITIAL_VERSION_TOKEN`], so a racing
    /// writer with different bytes is refused instead of replacing the seed.
    #[instrument(skip(self, content))]
    async fn create(&self, id: &str, content: &[u8]) -> Result<(), SeedStoreError> {
        let result = self
            .client
            .create_secret()
            .name(id)
            .secret_binary(Blob::new(content))
            .client_request_token(INITIAL_VERSION_TOKEN)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_exists_exception()) =>
            {
                self.fill_placeholder(id, content).await
            }
            Err(err) => Err(transport(id, &err)),
        }
    }
}

impl SecretsManagerStore {
    async fn fill_placeholder(&self, id: &str, content: &[u8]) -> Result<(), SeedStoreError> {
        let described = self
            .client
            .describe_secret()
            .secret_id(id)
            .send()
            .await
            .map_err(|err| transport(id, &err))?;
        if has_current_version(&described) {
            return Err(SeedStoreError::AlreadyExists { id: id.to_string() });
        }

        debug!("secret exists without a current version; filling it");
        let result = self
            .client
            .put_secret_value()
            .secret_id(id)
            .secret_binary(Blob::new(content))
            .client_request_token(INITIAL_VERSION_TOKEN)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_exists_exception()) =>
            {
                Err(SeedStoreError::AlreadyExists { id: id.to_string() })
            }
            Err(err) => Err(transport(id, &err)),
        }
    }
}

fn transport(id: &str, err: &(dyn std::error::Error + 'static)) -> SeedStoreError {
    SeedStoreError::Transport {
        id: id.to_string(),
        reason: DisplayErrorContext(err).to_string(),
    }
}

fn has_current_version(output: &DescribeSecretOutput) -> bool {
    output.version_ids_to_stages().is_some_and(|versions| {
        versions
            .values()
            .any(|stages| stages.iter().any(|stage| stage == CURRENT_STAGE))
    })
}

fn content_of(id: &str, output: &GetSecretValueOutput) -> Result<Option<Vec<u8>>, SeedStoreError> {
    match (output.secret_binary(), output.secret_string()) {
        (Some(blob), _) => Ok(Some(blob.as_ref().to_vec())),
        (None, Some(_)) => Err(SeedStoreError::InvalidContent {
            id: id.to_string(),
            reason: "secret holds a string value; seeds must be stored as binary".to_string(),
        }),
        (None, None) => Ok(Some(Vec::new())),
    }
}
