use std::collections::BTreeMap;

use crate::{asset::Asset, webscript::WebScriptRequest};

/// Everything a view resolver may look at for one request.
///
/// Built per request and handed to the resolvers explicitly.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    view_name: String,
    asset: Option<Asset>,
    parameters: BTreeMap<String, Vec<String>>,
}

impl RequestContext {
    pub fn new(view_name: impl Into<String>) -> Self {
        Self {
            view_name: view_name.into(),
            ..Self::default()
        }
    }

    /// Context for `request`, the view name is the request's path info.
    pub fn from_request<R: WebScriptRequest + ?Sized>(request: &R, asset: Option<Asset>) -> Self {
        let parameters = request
            .parameter_names()
            .into_iter()
            .map(|name| {
                let values = request
                    .parameter_values(name)
                    .unwrap_or_default()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (name.to_string(), values)
            })
            .collect();

        Self {
            view_name: request.path_info().to_string(),
            asset,
            parameters,
        }
    }

    #[must_use]
    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.asset = Some(asset);
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// The asset bound to this request, if the path named one
    pub const fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    /// First value of the query parameter `name`
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
