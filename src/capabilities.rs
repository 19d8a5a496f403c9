//! # Capabilities
//!
//! The collaborators an action may use, wired once at startup and shared by
//! every invocation.
//!
//! Two collaborators are always present (with defaults): the body
//! [`StreamFactory`] and the [`MimeSniffer`]. The others are optional and
//! checked where they are used: calling `redirect()` without a
//! [`UrlGenerator`], `template()` without a [`TemplateManager`] or `flash()`
//! without a [`FlashStore`] fails with
//! [`ActionError::MissingCapability`](crate::ActionError::MissingCapability).
//!
//! ```rust
//! use brrtaction::capabilities::Capabilities;
//! use brrtaction::flash::MemoryFlash;
//! use serde_json::{Map, Value};
//! use std::sync::Arc;
//!
//! let caps = Capabilities::builder()
//!     .url_generator(|location: &str, _params: &Map<String, Value>| {
//!         Ok::<_, anyhow::Error>(format!("/app{location}"))
//!     })
//!     .flash(Arc::new(MemoryFlash::new()))
//!     .build();
//!
//! assert!(caps.url_generator().is_some());
//! assert!(caps.templates().is_none());
//! ```

use crate::config::ActionConfig;
use crate::response::{BytesStreamFactory, ContentSniffer, MimeSniffer, StreamFactory};
use crate::templates::Template;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Generates a URL path from a location token and parameters
///
/// Implemented for closures of the same shape, so a router's URL builder can
/// be plugged in without a wrapper type.
pub trait UrlGenerator: Send + Sync {
    /// Produce the path for `location`
    ///
    /// # Errors
    ///
    /// Returns an error when the location cannot be resolved (e.g. unknown
    /// route name or missing route parameter).
    fn generate(&self, location: &str, params: &Map<String, Value>) -> anyhow::Result<String>;
}

impl<F> UrlGenerator for F
where
    F: Fn(&str, &Map<String, Value>) -> anyhow::Result<String> + Send + Sync,
{
    fn generate(&self, location: &str, params: &Map<String, Value>) -> anyhow::Result<String> {
        self(location, params)
    }
}

/// Loads renderable templates
pub trait TemplateManager: Send + Sync {
    /// Load the template at `path` bound to `data`
    ///
    /// # Errors
    ///
    /// Returns an error when the template does not exist or fails to compile.
    fn load(&self, path: &str, data: Map<String, Value>) -> anyhow::Result<Template>;
}

/// Stores one-shot messages for the next request of a session
pub trait FlashStore: Send + Sync {
    /// Queue `message` under `category`
    fn flash(&self, category: &str, message: &str);

    /// Remove and return the messages queued under `category`
    fn take(&self, category: &str) -> Vec<String>;
}

/// Collaborators and settings shared by every action invocation
#[derive(Clone)]
pub struct Capabilities {
    streams: Arc<dyn StreamFactory>,
    sniffer: Arc<dyn MimeSniffer>,
    urls: Option<Arc<dyn UrlGenerator>>,
    templates: Option<Arc<dyn TemplateManager>>,
    flash: Option<Arc<dyn FlashStore>>,
    config: ActionConfig,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("url_generator", &self.urls.is_some())
            .field("templates", &self.templates.is_some())
            .field("flash", &self.flash.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Capabilities {
    /// Start building a capability set
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Body stream factory
    #[must_use]
    pub fn stream_factory(&self) -> &dyn StreamFactory {
        self.streams.as_ref()
    }

    /// MIME sniffer
    #[must_use]
    pub fn sniffer(&self) -> &dyn MimeSniffer {
        self.sniffer.as_ref()
    }

    /// URL generator, if one was supplied
    #[must_use]
    pub fn url_generator(&self) -> Option<&dyn UrlGenerator> {
        self.urls.as_deref()
    }

    /// Template manager, if one was supplied
    #[must_use]
    pub fn templates(&self) -> Option<&dyn TemplateManager> {
        self.templates.as_deref()
    }

    /// Flash store, if one was supplied
    #[must_use]
    pub fn flash_store(&self) -> Option<&dyn FlashStore> {
        self.flash.as_deref()
    }

    /// Runtime settings
    #[must_use]
    pub fn config(&self) -> &ActionConfig {
        &self.config
    }
}

/// Builder for [`Capabilities`]
///
/// Defaults: [`BytesStreamFactory`], [`ContentSniffer`], no optional
/// collaborators and [`ActionConfig::default`].
pub struct CapabilitiesBuilder {
    streams: Arc<dyn StreamFactory>,
    sniffer: Arc<dyn MimeSniffer>,
    urls: Option<Arc<dyn UrlGenerator>>,
    templates: Option<Arc<dyn TemplateManager>>,
    flash: Option<Arc<dyn FlashStore>>,
    config: ActionConfig,
}

impl Default for CapabilitiesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilitiesBuilder {
    /// Create a builder with the default collaborators
    #[must_use]
    pub fn new() -> Self {
        Self {
            streams: Arc::new(BytesStreamFactory),
            sniffer: Arc::new(ContentSniffer),
            urls: None,
            templates: None,
            flash: None,
            config: ActionConfig::default(),
        }
    }

    /// Replace the body stream factory
    #[must_use]
    pub fn stream_factory(mut self, streams: Arc<dyn StreamFactory>) -> Self {
        self.streams = streams;
        self
    }

    /// Replace the MIME sniffer
    #[must_use]
    pub fn sniffer(mut self, sniffer: Arc<dyn MimeSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    /// Supply a URL generator, enabling `redirect()`
    #[must_use]
    pub fn url_generator<U: UrlGenerator + 'static>(mut self, urls: U) -> Self {
        self.urls = Some(Arc::new(urls));
        self
    }

    /// Supply a template manager, enabling `template()`
    #[must_use]
    pub fn templates(mut self, templates: Arc<dyn TemplateManager>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Supply a flash store, enabling `flash()`
    #[must_use]
    pub fn flash(mut self, flash: Arc<dyn FlashStore>) -> Self {
        self.flash = Some(flash);
        self
    }

    /// Replace the runtime settings
    #[must_use]
    pub fn config(mut self, config: ActionConfig) -> Self {
        self.config = config;
        self
    }

    /// Finish the capability set
    #[must_use]
    pub fn build(self) -> Capabilities {
        Capabilities {
            streams: self.streams,
            sniffer: self.sniffer,
            urls: self.urls,
            templates: self.templates,
            flash: self.flash,
            config: self.config,
        }
    }
}
