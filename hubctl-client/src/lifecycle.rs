//! Stack instance lifecycle commands
//!
//! Create, patch, deploy, undeploy, delete and kubeconfig retrieval. Every
//! command except create starts by resolving the user's selector to an
//! instance id.

use hubctl_core::domain::instance::StackInstance;
use hubctl_core::dto::instance::{DeployResponse, StackInstanceRequest};
use std::fmt;
use tracing::{info, warn};

use crate::HubClient;
use crate::error::{ClientError, Result};
use crate::patch::InstancePatch;
use crate::paths::{self, INSTANCES_RESOURCE};
use crate::resolver::{InstanceCache, Selector};

/// Asynchronous operation that can be requested on an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleVerb {
    Deploy,
    Undeploy,
}

impl LifecycleVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleVerb::Deploy => "deploy",
            LifecycleVerb::Undeploy => "undeploy",
        }
    }
}

impl fmt::Display for LifecycleVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a deploy or undeploy request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub instance_id: String,
    /// Domain to follow logs by
    pub domain: String,
    /// Automation job started by the hub, empty when none was reported
    pub job_id: String,
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub instance_id: String,
    /// Tolerated anomaly encountered on the way
    pub warning: Option<String>,
}

/// Kubeconfig of an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kubeconfig {
    pub domain: String,
    pub data: Vec<u8>,
}

impl HubClient {
    // =============================================================================
    // Create
    // =============================================================================

    /// Create an instance from a typed request
    pub async fn create_instance(&self, req: &StackInstanceRequest) -> Result<StackInstance> {
        let body = serde_json::to_vec(req)
            .map_err(|e| ClientError::InvalidPayload(format!("unable to encode request: {}", e)))?;
        self.create_instance_raw(body).await
    }

    /// Create an instance from a caller-supplied JSON document
    pub async fn create_instance_raw(&self, body: Vec<u8>) -> Result<StackInstance> {
        const ACTION: &str = "creating Stack Instance";

        let reply = self.post2(INSTANCES_RESOURCE, Some(body), ACTION).await?;
        match reply.status {
            200 | 201 => reply
                .body
                .ok_or_else(|| ClientError::EmptyBody(ACTION.to_string())),
            status => Err(ClientError::unexpected_status(ACTION, status, &[200, 201])),
        }
    }

    // =============================================================================
    // Patch
    // =============================================================================

    /// Submit a patch and return the instance as the hub now has it
    ///
    /// The cache is not updated; the returned instance is the post-patch
    /// snapshot.
    pub async fn patch_instance(
        &self,
        cache: &mut InstanceCache,
        selector: &str,
        patch: &InstancePatch,
    ) -> Result<StackInstance> {
        const ACTION: &str = "patching Stack Instance";

        let instance = self.resolve(cache, selector).await?;
        let path = patch.path(&instance.id);
        let reply = match patch.change() {
            Some(change) => self.patch(&path, change, ACTION).await?,
            None => self.patch2(&path, patch.payload()?, ACTION).await?,
        };
        match reply.status {
            200 => reply
                .body
                .ok_or_else(|| ClientError::EmptyBody(ACTION.to_string())),
            status => Err(ClientError::unexpected_status(ACTION, status, &[200])),
        }
    }

    // =============================================================================
    // Deploy / Undeploy
    // =============================================================================

    /// Request deployment of an instance
    pub async fn deploy_instance(
        &self,
        cache: &mut InstanceCache,
        selector: &str,
        dry_run: bool,
    ) -> Result<CommandOutcome> {
        self.command_instance(cache, selector, LifecycleVerb::Deploy, dry_run)
            .await
    }

    /// Request undeployment of an instance
    pub async fn undeploy_instance(
        &self,
        cache: &mut InstanceCache,
        selector: &str,
        dry_run: bool,
    ) -> Result<CommandOutcome> {
        self.command_instance(cache, selector, LifecycleVerb::Undeploy, dry_run)
            .await
    }

    async fn command_instance(
        &self,
        cache: &mut InstanceCache,
        selector: &str,
        verb: LifecycleVerb,
        dry_run: bool,
    ) -> Result<CommandOutcome> {
        let action = format!("in response to {} Stack Instance", verb);

        let instance = self.resolve(cache, selector).await?;
        let path = paths::command(&instance.id, verb.as_str(), dry_run);
        let reply = self.post2::<DeployResponse>(&path, None, &action).await?;
        if !matches!(reply.status, 200 | 202 | 204) {
            return Err(ClientError::unexpected_status(
                action,
                reply.status,
                &[200, 202, 204],
            ));
        }

        let job_id = reply.body.unwrap_or_default().job_id;
        info!("Instance {} automation task id: {}", verb, job_id);

        Ok(CommandOutcome {
            instance_id: instance.id,
            domain: instance.domain,
            job_id,
        })
    }

    // =============================================================================
    // Delete
    // =============================================================================

    /// Delete an instance
    ///
    /// An instance the client cannot decode can still be deleted by its
    /// numeric id: in that case the selector itself is used as the id and
    /// the decode failure is reported as a warning.
    pub async fn delete_instance(
        &self,
        cache: &mut InstanceCache,
        selector: &str,
    ) -> Result<DeleteOutcome> {
        const ACTION: &str = "deleting Stack Instance";

        let (instance_id, warning) = match self.resolve(cache, selector).await {
            Ok(instance) => (instance.id, None),
            Err(err) if err.is_decode() && Selector::is_id(selector) => {
                warn!("{}", err);
                (selector.to_string(), Some(err.to_string()))
            }
            Err(err) => return Err(err),
        };

        let status = self.delete(&paths::instance(&instance_id)).await?;
        if !matches!(status, 202 | 204) {
            return Err(ClientError::unexpected_status(ACTION, status, &[202, 204]));
        }

        Ok(DeleteOutcome {
            instance_id,
            warning,
        })
    }

    // =============================================================================
    // Kubeconfig
    // =============================================================================

    /// Fetch the kubeconfig of an instance
    pub async fn fetch_kubeconfig(
        &self,
        cache: &mut InstanceCache,
        selector: &str,
    ) -> Result<Kubeconfig> {
        const ACTION: &str = "fetching Stack Instance Kubeconfig";

        let instance = self.resolve(cache, selector).await?;
        let response = self.get2(&paths::kubeconfig(&instance.id)).await?;
        if response.status != 200 {
            return Err(ClientError::unexpected_status(
                ACTION,
                response.status,
                &[200],
            ));
        }
        if response.body.is_empty() {
            return Err(ClientError::EmptyBody(ACTION.to_string()));
        }

        Ok(Kubeconfig {
            domain: instance.domain,
            data: response.body,
        })
    }
}
