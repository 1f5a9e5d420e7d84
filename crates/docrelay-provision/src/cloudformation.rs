//! CloudFormation stack engine backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::config::Credentials;
use aws_sdk_cloudformation::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, OnFailure as CfnOnFailure};
use aws_sdk_cloudformation::Client;

use crate::stack::{
    OnFailure, StackDescription, StackEngine, StackError, StackResult, StackStatus,
};

/// CloudFormation-backed [`StackEngine`].
///
/// The client is constructed once per instance and reused across calls.
#[derive(Clone)]
pub struct CloudFormationStackEngine {
    client: Client,
}

impl CloudFormationStackEngine {
    /// Create a new engine for `region`, authenticating with the explicit
    /// key pair when given, otherwise with the ambient provider chain.
    pub async fn new(region: String, credentials: Option<(String, String)>) -> Self {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let Some((key, secret)) = credentials {
            loader =
                loader.credentials_provider(Credentials::new(key, secret, None, None, "docrelay"));
        }
        let config = loader.load().await;

        Self {
            client: Client::new(&config),
        }
    }
}

fn map_sdk_error<E>(err: SdkError<E>) -> StackError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(ctx) => {
            let code = err.code().map(str::to_string);
            let message = err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| ctx.err().to_string());
            // "Stack with id X does not exist" arrives as a ValidationError.
            if code.as_deref() == Some("ValidationError") && message.contains("does not exist") {
                return StackError::NotFound(message);
            }
            StackError::Provider { code, message }
        }
        _ => StackError::Other(err.to_string()),
    }
}

impl From<OnFailure> for CfnOnFailure {
    fn from(on_failure: OnFailure) -> Self {
        match on_failure {
            OnFailure::Rollback => CfnOnFailure::Rollback,
            OnFailure::Delete => CfnOnFailure::Delete,
            OnFailure::DoNothing => CfnOnFailure::DoNothing,
        }
    }
}

#[async_trait]
impl StackEngine for CloudFormationStackEngine {
    async fn create_stack(
        &self,
        name: &str,
        template: &str,
        capabilities: &[String],
        on_failure: OnFailure,
    ) -> StackResult<()> {
        tracing::info!(stack = name, "create stack");
        let capabilities = capabilities
            .iter()
            .map(|cap| Capability::from(cap.as_str()))
            .collect();
        self.client
            .create_stack()
            .stack_name(name)
            .template_body(template)
            .set_capabilities(Some(capabilities))
            .on_failure(on_failure.into())
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn update_stack(&self, name: &str, template: &str) -> StackResult<()> {
        tracing::info!(stack = name, "update stack");
        self.client
            .update_stack()
            .stack_name(name)
            .template_body(template)
            .capabilities(Capability::CapabilityNamedIam)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_stack(&self, name: &str) -> StackResult<()> {
        tracing::info!(stack = name, "delete stack");
        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    async fn describe_stack(&self, name: &str) -> StackResult<Option<StackDescription>> {
        let output = match self
            .client
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                return match map_sdk_error(err) {
                    StackError::NotFound(_) => Ok(None),
                    other => Err(other),
                };
            }
        };

        let Some(stack) = output.stacks().first() else {
            return Ok(None);
        };

        let status = stack
            .stack_status()
            .map(|s| StackStatus::from(s.as_str()))
            .unwrap_or_else(|| StackStatus::Other("UNKNOWN".to_string()));

        let mut outputs = BTreeMap::new();
        for output in stack.outputs() {
            if let (Some(key), Some(value)) = (output.output_key(), output.output_value()) {
                outputs.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Some(StackDescription { status, outputs }))
    }
}
