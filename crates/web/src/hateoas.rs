use axum::Json;
use serde::Serialize;

use crate::base_url::BaseUrl;

#[derive(Debug, Clone, Serialize)]
pub struct Link {
    #[serde(rename = "rel")]
    pub relation: String,

    #[serde(rename = "href")]
    pub hypertext_reference: String,
}

/// A resource together with links to related resources.
#[derive(Debug, Clone, Serialize)]
pub struct Response<T> {
    #[serde(flatten)]
    pub content: T,
    pub links: Vec<Link>,
}

impl<T> Response<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            links: vec![],
        }
    }

    pub fn builder(content: T, base_url: &BaseUrl) -> ResponseBuilder<'_, T> {
        ResponseBuilder::new(content, base_url)
    }

    pub fn json(self) -> Json<Self> {
        Json(self)
    }
}

pub struct ResponseBuilder<'b, T> {
    response: Response<T>,
    base_url: &'b BaseUrl,
}

impl<'b, T> ResponseBuilder<'b, T> {
    pub fn new(content: T, base_url: &'b BaseUrl) -> Self {
        Self {
            response: Response::new(content),
            base_url,
        }
    }

    /// Adds a link to `path`, resolved against the base url of the request.
    pub fn link<R, H>(self, relation: R, path: H) -> Self
    where
        R: Into<String>,
        H: AsRef<str>,
    {
        let url = self.base_url.full_url(path);
        self.link_extern(relation, url)
    }

    pub fn link_option<R, H>(self, relation: R, path: Option<H>) -> Self
    where
        R: Into<String>,
        H: AsRef<str>,
    {
        match path {
            Some(path) => self.link(relation, path),
            None => self,
        }
    }

    /// Adds a link to an already complete url.
    pub fn link_extern<R, H>(mut self, relation: R, hypertext_reference: H) -> Self
    where
        R: Into<String>,
        H: Into<String>,
    {
        self.response.links.push(Link {
            relation: relation.into(),
            hypertext_reference: hypertext_reference.into(),
        });
        self
    }

    pub fn link_extern_option<R, H>(self, relation: R, hypertext_reference: Option<H>) -> Self
    where
        R: Into<String>,
        H: Into<String>,
    {
        match hypertext_reference {
            Some(href) => self.link_extern(relation, href),
            None => self,
        }
    }

    pub fn build(self) -> Response<T> {
        self.response
    }
}
