/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use crate::header::IcapHeaderMap;
use crate::response::IcapResponse;
use crate::service::IcapMethod;

mod error;
pub use error::IcapOptionsParseError;

/// Service capabilities announced in an OPTIONS response.
#[derive(Clone, Debug, Default)]
pub struct IcapServiceOptions {
    pub methods: Vec<IcapMethod>,
    pub service: Option<String>,
    pub service_tag: String,
    pub service_id: Option<String>,
    pub support_204: bool,
    pub support_206: bool,
    pub preview_size: Option<usize>,
    pub transfer_preview: Vec<String>,
    pub transfer_ignore: Vec<String>,
    pub transfer_complete: Vec<String>,
    pub max_connections: Option<usize>,
    pub ttl: Option<Duration>,
}

fn list_values<'a>(headers: &'a IcapHeaderMap, name: &str) -> impl Iterator<Item = &'a str> {
    headers
        .get_all(name)
        .iter()
        .flat_map(|v| v.split(','))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn number_value<T: atoi::FromRadix10Checked>(
    headers: &IcapHeaderMap,
    name: &'static str,
) -> Result<Option<T>, IcapOptionsParseError> {
    match headers.get(name) {
        Some(v) => {
            let v = v.trim().as_bytes();
            match atoi::FromRadix10Checked::from_radix_10_checked(v) {
                (Some(n), len) if len == v.len() && len > 0 => Ok(Some(n)),
                _ => Err(IcapOptionsParseError::InvalidHeaderValue(name)),
            }
        }
        None => Ok(None),
    }
}

impl IcapServiceOptions {
    /// Extract the options of a service which is expected to handle `method`.
    pub fn parse(rsp: &IcapResponse, method: IcapMethod) -> Result<Self, IcapOptionsParseError> {
        if !(200..300).contains(&rsp.code) {
            return Err(IcapOptionsParseError::RequestFailed(
                rsp.code,
                rsp.reason.clone(),
            ));
        }
        let headers = &rsp.headers;

        let mut options = IcapServiceOptions::default();
        for name in list_values(headers, "Methods") {
            if let Ok(m) = IcapMethod::from_str(name) {
                if !options.methods.contains(&m) {
                    options.methods.push(m);
                }
            }
        }
        if !options.methods.contains(&method) {
            return Err(IcapOptionsParseError::MethodNotMatch);
        }

        match headers.get("ISTag") {
            Some(tag) if !tag.is_empty() => options.service_tag = tag.to_string(),
            _ => return Err(IcapOptionsParseError::NoServiceTagSet),
        }
        options.service = headers.get("Service").map(|s| s.to_string());
        options.service_id = headers.get("Service-ID").map(|s| s.to_string());

        for v in list_values(headers, "Allow") {
            match v {
                "204" => options.support_204 = true,
                "206" => options.support_206 = true,
                _ => {}
            }
        }

        options.preview_size = number_value(headers, "Preview")?;
        options.max_connections = number_value(headers, "Max-Connections")?;
        options.ttl = number_value::<u64>(headers, "Options-TTL")?.map(Duration::from_secs);

        options.transfer_preview = list_values(headers, "Transfer-Preview")
            .map(|s| s.to_string())
            .collect();
        options.transfer_ignore = list_values(headers, "Transfer-Ignore")
            .map(|s| s.to_string())
            .collect();
        options.transfer_complete = list_values(headers, "Transfer-Complete")
            .map(|s| s.to_string())
            .collect();

        Ok(options)
    }
}
