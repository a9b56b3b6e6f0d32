// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;
use vitrin_app::{
    CatalogBackend, Category, CategoryId, CategoryPayload, ImageUpload, Product, ProductId,
    ProductPage, ProductPayload, ProductQuery, Subcategory, SubcategoryId, SubcategoryPayload,
};

/// Blocking client for the catalog REST API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Confirms the server answers a category listing.
    pub fn ping(&self) -> Result<()> {
        self.list_categories().map(|_| ())
    }

    pub fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.get_json(self.endpoint(&format!("/categories/{id}"), &[])?, "category")
    }

    pub fn get_product(&self, id: ProductId) -> Result<Product> {
        self.get_json(self.endpoint(&format!("/products/{id}"), &[])?, "product")
    }

    pub fn search_products(&self, name: &str) -> Result<Vec<Product>> {
        let url = self.endpoint("/products/search", &[("name", name.to_owned())])?;
        let body: ProductListBody = self.get_json(url, "product search")?;
        Ok(body.into_page().items)
    }

    pub fn list_products_by_category(&self, id: CategoryId, page: u32) -> Result<ProductPage> {
        let url = self.endpoint(
            &format!("/products/category/{id}"),
            &[("page", page.max(1).to_string())],
        )?;
        let body: ProductListBody = self.get_json(url, "products by category")?;
        Ok(body.into_page())
    }

    pub fn list_products_by_subcategory(
        &self,
        id: SubcategoryId,
        page: u32,
    ) -> Result<ProductPage> {
        let url = self.endpoint(
            &format!("/products/subcategory/{id}"),
            &[("page", page.max(1).to_string())],
        )?;
        let body: ProductListBody = self.get_json(url, "products by subcategory")?;
        Ok(body.into_page())
    }

    pub fn list_all_products_by_category(&self, id: CategoryId) -> Result<Vec<Product>> {
        let url = self.endpoint(&format!("/products/category/all/{id}"), &[])?;
        let body: ProductListBody = self.get_json(url, "products by category")?;
        Ok(body.into_page().items)
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .with_context(|| format!("build URL for {path}"))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self.send(self.http.get(url))?;
        response.json().with_context(|| format!("decode {what} response"))
    }

    fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<()> {
        let url = self.endpoint(path, &[])?;
        debug!(url = %url, "POST");
        self.send(self.http.post(url).json(body)).map(|_| ())
    }

    fn put_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<()> {
        let url = self.endpoint(path, &[])?;
        debug!(url = %url, "PUT");
        self.send(self.http.put(url).json(body)).map(|_| ())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path, &[])?;
        debug!(url = %url, "DELETE");
        self.send(self.http.delete(url)).map(|_| ())
    }
}

impl CatalogBackend for Client {
    fn list_categories(&self) -> Result<Vec<Category>> {
        self.get_json(self.endpoint("/categories", &[])?, "category list")
    }

    fn list_subcategories(&self) -> Result<Vec<Subcategory>> {
        self.get_json(
            self.endpoint("/categories/subcategories", &[])?,
            "subcategory list",
        )
    }

    fn create_category(&self, payload: &CategoryPayload) -> Result<()> {
        self.post_json("/categories", payload)
    }

    fn update_category(&self, id: CategoryId, payload: &CategoryPayload) -> Result<()> {
        self.put_json(&format!("/categories/{id}"), payload)
    }

    fn delete_category(&self, id: CategoryId) -> Result<()> {
        self.delete(&format!("/categories/{id}"))
    }

    fn create_subcategory(&self, payload: &SubcategoryPayload) -> Result<()> {
        self.post_json("/categories/subcategory", payload)
    }

    fn update_subcategory(&self, id: SubcategoryId, payload: &SubcategoryPayload) -> Result<()> {
        self.put_json(&format!("/categories/subcategory/{id}"), payload)
    }

    fn delete_subcategory(&self, id: SubcategoryId) -> Result<()> {
        self.delete(&format!("/categories/subcategory/{id}"))
    }

    fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let mut params = vec![("page", query.page.max(1).to_string())];
        if let Some(category_id) = query.category_id {
            params.push(("categoryId", category_id.to_string()));
        }
        if let Some(subcategory_id) = query.subcategory_id {
            params.push(("subcategoryId", subcategory_id.to_string()));
        }
        let body: ProductListBody =
            self.get_json(self.endpoint("/products", &params)?, "product list")?;
        Ok(body.into_page())
    }

    fn create_product(&self, payload: &ProductPayload) -> Result<()> {
        self.post_json("/products", payload)
    }

    fn update_product(&self, id: ProductId, payload: &ProductPayload) -> Result<()> {
        self.put_json(&format!("/products/{id}"), payload)
    }

    fn delete_product(&self, id: ProductId) -> Result<()> {
        self.delete(&format!("/products/{id}"))
    }

    fn upload_image(&self, image: &ImageUpload) -> Result<String> {
        let part = Part::bytes(image.data.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .with_context(|| format!("invalid image type {:?}", image.mime_type))?;
        let form = Form::new().part("img", part);
        let url = self.endpoint("/img", &[])?;
        debug!(url = %url, file = %image.file_name, "POST multipart");
        let response = self.send(self.http.post(url).multipart(form))?;
        let parsed: UploadResponse = response.json().context("decode image upload response")?;
        if parsed.file.path.trim().is_empty() {
            bail!("image upload returned an empty path");
        }
        Ok(parsed.file.path)
    }

    fn delete_image(&self, file_name: &str) -> Result<()> {
        let mut url = self.endpoint("/img", &[])?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("api.base_url cannot carry a path"))?
            .push(file_name);
        debug!(url = %url, "DELETE");
        self.send(self.http.delete(url)).map(|_| ())
    }
}

/// The `scheme://host[:port]` part of `base_url`, where uploaded image paths
/// are served from.
pub fn url_origin(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)
        .with_context(|| format!("{base_url:?} is not a valid URL"))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        bail!("{base_url:?} has no host to serve images from");
    }
    Ok(origin.ascii_serialization())
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!(
            "{base_url} did not answer in time -- check the server or raise api.timeout"
        );
    }
    anyhow!(
        "cannot reach {base_url} -- check api.base_url and that the server is running ({error})"
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), trimmed);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductListBody {
    Paged(PagedProducts),
    Bare(Vec<Product>),
}

impl ProductListBody {
    fn into_page(self) -> ProductPage {
        match self {
            Self::Paged(paged) => ProductPage {
                items: paged.items,
                total_pages: paged.page.map_or(1, |page| page.total_pages),
            },
            Self::Bare(items) => ProductPage {
                items,
                total_pages: 1,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PagedProducts {
    #[serde(alias = "products")]
    items: Vec<Product>,
    #[serde(default)]
    page: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    path: String,
}
