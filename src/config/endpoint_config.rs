//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use getset::Getters;
use serde::Deserialize;

/// Configuration of the docker endpoint
#[derive(Clone, Debug, Getters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
    /// The URI where the endpoint is reachable
    #[getset(get = "pub")]
    uri: String,

    /// The type of the endpoint (either "socket" or "http")
    #[getset(get = "pub")]
    endpoint_type: EndpointType,

    /// Sets the networking mode for the containers.
    /// Supported standard values are: "bridge", "host", "none", and "container:<name|id>". Any
    /// other value is taken as a custom network's name to which this container should connect to.
    /// (See https://docs.docker.com/engine/api/v1.45/#tag/Image/operation/ImageBuild)
    #[getset(get = "pub")]
    network_mode: Option<String>,
}

/// The type of an endpoint
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub enum EndpointType {
    #[serde(rename = "socket")]
    Socket,
    #[serde(rename = "http")]
    Http,
}
