//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Error;
use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use shiplift::Docker;
use tracing::debug;
use tracing::error;
use tracing::trace;
use tracing::warn;

use crate::config::Configuration;
use crate::config::EndpointType;
use crate::config::LanguageProfile;
use crate::consts::SOURCE_DIR_PATH;
use crate::language::Language;
use crate::sandbox::Sandbox;
use crate::sandbox::SandboxError;
use crate::util::docker::ContainerHash;
use crate::util::docker::ImageName;
use crate::util::tty::combined_output;

/// A sandbox that runs every piece of code in a fresh container on a docker daemon
pub struct DockerSandbox {
    uri: String,
    docker: Docker,
    network_mode: Option<String>,
    profiles: BTreeMap<Language, LanguageProfile>,
}

impl std::fmt::Debug for DockerSandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "DockerSandbox({})", self.uri)
    }
}

impl DockerSandbox {
    /// Connect to the configured docker daemon and check that it is usable
    pub async fn setup(config: &Configuration) -> Result<Self> {
        let ep = config.docker().endpoint();
        let docker = match ep.endpoint_type() {
            EndpointType::Http => shiplift::Uri::from_str(ep.uri())
                .map(Docker::host)
                .with_context(|| anyhow!("Connecting to {}", ep.uri()))
                .map_err(Error::from)?,

            EndpointType::Socket => Docker::unix(ep.uri()),
        };

        let sandbox = DockerSandbox::new(
            ep.uri().clone(),
            docker,
            ep.network_mode().clone(),
            config.profiles().clone(),
        );

        let versions_compat = sandbox.check_version_compat(config.docker().docker_versions().as_ref());
        let api_versions_compat =
            sandbox.check_api_version_compat(config.docker().docker_api_versions().as_ref());
        let required_images = sandbox
            .profiles
            .values()
            .map(|p| p.image().clone())
            .collect::<Vec<_>>();
        let imgs_avail = async {
            if config.docker().verify_images_present() {
                sandbox.check_images_available(&required_images).await
            } else {
                Ok(())
            }
        };

        let (versions_compat, api_versions_compat, imgs_avail) =
            tokio::join!(versions_compat, api_versions_compat, imgs_avail);

        versions_compat.with_context(|| anyhow!("Checking version compatibility for {}", sandbox.uri))?;
        api_versions_compat.with_context(|| anyhow!("Checking API version compatibility for {}", sandbox.uri))?;
        imgs_avail.with_context(|| anyhow!("Checking for available images on {}", sandbox.uri))?;

        debug!("Docker sandbox ready: {}", sandbox.uri);
        Ok(sandbox)
    }

    pub fn new(
        uri: String,
        docker: Docker,
        network_mode: Option<String>,
        profiles: BTreeMap<Language, LanguageProfile>,
    ) -> Self {
        DockerSandbox {
            uri,
            docker,
            network_mode,
            profiles,
        }
    }

    async fn check_version_compat(&self, req: Option<&Vec<String>>) -> Result<()> {
        match req {
            None => Ok(()),
            Some(v) => {
                let avail = self
                    .docker
                    .version()
                    .await
                    .with_context(|| anyhow!("Getting version of docker daemon: {}", self.uri))?;

                if !v.contains(&avail.version) {
                    Err(anyhow!(
                        "Incompatible docker version on {}: Available: {}, Expected one of: [{}]",
                        self.uri,
                        avail.version,
                        v.join(", ")
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    async fn check_api_version_compat(&self, req: Option<&Vec<String>>) -> Result<()> {
        match req {
            None => Ok(()),
            Some(v) => {
                let avail = self
                    .docker
                    .version()
                    .await
                    .with_context(|| anyhow!("Getting API version of docker daemon: {}", self.uri))?;

                if !v.contains(&avail.api_version) {
                    Err(anyhow!(
                        "Incompatible docker API version on {}: Available: {}, Expected one of: [{}]",
                        self.uri,
                        avail.api_version,
                        v.join(", ")
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    async fn check_images_available(&self, imgs: &[ImageName]) -> Result<()> {
        use shiplift::ImageListOptions;

        trace!("Checking availability of images: {:?}", imgs);
        let available_names = self
            .docker
            .images()
            .list(&ImageListOptions::builder().all().build())
            .await
            .with_context(|| anyhow!("Listing images on {}", self.uri))?
            .into_iter()
            .flat_map(|image_rep| {
                image_rep
                    .repo_tags
                    .unwrap_or_default()
                    .into_iter()
                    .map(ImageName::from)
            })
            .collect::<Vec<ImageName>>();

        trace!("Available images = {:?}", available_names);

        imgs.iter()
            .map(|img| {
                if !available_names.contains(img) {
                    Err(anyhow!("Image '{}' missing from {}", img, self.uri))
                } else {
                    Ok(())
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(|_| ())
    }

    async fn run(&self, code: &str, language: Language) -> std::result::Result<String, SandboxError> {
        let profile = self
            .profiles
            .get(&language)
            .ok_or(SandboxError::NoProfile(language))?;

        let container_id = self.create_container(profile).await?;
        let result = self.run_in_container(&container_id, code, profile).await;

        // The container is removed no matter how the run went
        if let Err(e) = self
            .docker
            .containers()
            .get(container_id.as_ref())
            .remove(shiplift::RmContainerOptions::builder().force(true).build())
            .await
        {
            warn!("Failed to remove container {}: {}", container_id, e);
        }

        result
    }

    async fn create_container(&self, profile: &LanguageProfile) -> std::result::Result<ContainerHash, SandboxError> {
        let mut builder = shiplift::ContainerOptions::builder(profile.image().as_ref());
        builder
            .cmd(profile.command().iter().map(AsRef::as_ref).collect())
            .working_dir(SOURCE_DIR_PATH);

        if let Some(network_mode) = self.network_mode.as_ref() {
            builder.network_mode(network_mode);
        }

        let builder_opts = builder.build();
        trace!("Builder options = {:?}", builder_opts);

        let create_info = self
            .docker
            .containers()
            .create(&builder_opts)
            .await
            .map_err(|source| SandboxError::Create {
                image: profile.image().clone(),
                uri: self.uri.clone(),
                source,
            })?;

        if let Some(warnings) = create_info.warnings.as_ref() {
            warnings.iter().for_each(|w| warn!("{}", w));
        }

        debug!("Created container {} from {}", create_info.id, profile.image());
        Ok(ContainerHash::from(create_info.id))
    }

    async fn run_in_container(
        &self,
        container_id: &ContainerHash,
        code: &str,
        profile: &LanguageProfile,
    ) -> std::result::Result<String, SandboxError> {
        let container = self.docker.containers().get(container_id.as_ref());
        let destination = format!("{}/{}", SOURCE_DIR_PATH, profile.source_file());

        trace!("Copying code to {}:{}", container_id, destination);
        container
            .copy_file_into(&destination, code.as_bytes())
            .await
            .map_err(|e| SandboxError::container("Copying code into container", container_id, e))?;

        container
            .start()
            .await
            .map_err(|e| SandboxError::container("Starting container", container_id, e))?;

        let exit = container
            .wait()
            .await
            .map_err(|e| SandboxError::container("Waiting for container", container_id, e))?;
        debug!("Container {} exited with {}", container_id, exit.status_code);

        let logs_opts = shiplift::LogsOptions::builder().stdout(true).stderr(true).build();
        let chunks = container
            .logs(&logs_opts)
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| SandboxError::container("Fetching container logs", container_id, e))?;

        Ok(combined_output(chunks))
    }
}

#[async_trait]
impl Sandbox for DockerSandbox {
    async fn execute(&self, code: &str, language: Language) -> String {
        match self.run(code, language).await {
            Ok(output) => output,
            Err(e) => {
                error!("Sandbox failed for {} code: {:?}", language, e);
                e.as_build_output()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::consts::SANDBOX_ERROR_PREFIX;

    fn unreachable_sandbox(profiles: BTreeMap<Language, LanguageProfile>) -> DockerSandbox {
        let uri = "http://127.0.0.1:1";
        let docker = Docker::host(shiplift::Uri::from_str(uri).unwrap());
        DockerSandbox::new(uri.to_string(), docker, None, profiles)
    }

    #[tokio::test]
    async fn test_missing_profile_is_build_output() {
        let sandbox = unreachable_sandbox(BTreeMap::new());
        let out = sandbox.execute("print(1)", Language::Python).await;
        assert!(out.starts_with(SANDBOX_ERROR_PREFIX), "Unexpected output: {}", out);
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_build_output() {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            Language::Python,
            LanguageProfile::new("python:3.9-slim", "main.py", &["python", "main.py"]),
        );

        let sandbox = unreachable_sandbox(profiles);
        let out = sandbox.execute("print(1)", Language::Python).await;
        assert!(out.starts_with(SANDBOX_ERROR_PREFIX), "Unexpected output: {}", out);
        assert!(out.contains("python:3.9-slim"));
        assert!(!crate::db::models::is_clean_build(&out));
    }
}
