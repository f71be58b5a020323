//! Resource controllers
//!
//! A resource type is exposed by implementing [`ResourceController`] (read
//! side) and, when it can be written, [`WritableController`]. The hooks only
//! know about their own domain. [`ResourceEndpoint`] drives them: it owns
//! filtering order, sorting, pagination, error accumulation, bulk looping
//! and rendering through the registered adapters.
//!
//! # Example
//!
//! ```rust,ignore
//! let endpoint = ResourceEndpoint::new(api.clone(), TranslationController::new(i18n, observer.clone()), observer);
//!
//! let query = JsonApiQuery::from_pairs(params)?;
//! let document = endpoint.index(query).await?;
//! ```

use crate::core::adapter::AdapterError;
use crate::core::api::JsonApi;
use crate::core::document::{Document, ErrorScope, PrimaryData};
use crate::core::error::ErrorObject;
use crate::core::observer::Observer;
use crate::core::query::JsonApiQuery;
use crate::core::resource::{Linkage, ResourceData, ResourceIdentifier, ResourceObject};
use crate::core::sorter::{Sortable, Sorter};
use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{Value, json};
use std::any::Any;
use std::sync::Arc;

/// A relationship a resource type declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipDefinition {
    pub name: &'static str,
    pub target_type: &'static str,
}

/// Static description of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDefinition {
    pub resource_type: &'static str,
    pub attributes: &'static [&'static str],
    pub relationships: &'static [RelationshipDefinition],
    /// Whitelist for the `sort` parameter
    pub sort_fields: &'static [&'static str],
    /// Whether array submissions (bulk extension) are accepted
    pub bulk: bool,
}

impl ResourceDefinition {
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(&name)
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipDefinition> {
        self.relationships.iter().find(|r| r.name == name)
    }
}

/// One page of an index read
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of entries after filtering, before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Outcome of one item of a bulk write
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome<T> {
    Success(T),
    Failure(Vec<ErrorObject>),
}

impl<T> ItemOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            ItemOutcome::Success(value) => Some(value),
            ItemOutcome::Failure(_) => None,
        }
    }
}

/// Read-side hooks of a resource type
#[async_trait]
pub trait ResourceController: Send + Sync {
    /// The domain value behind one resource
    type Resource: Sortable + Any + Send + Sync;

    /// Filter criteria resolved from a query
    type Filter: Send + Sync;

    fn definition(&self) -> &ResourceDefinition;

    /// Interpret the query's filters
    ///
    /// Unknown filter names are recorded as errors in `document` and
    /// otherwise ignored.
    fn resolve_filters(&self, query: &JsonApiQuery, document: &mut Document) -> Self::Filter;

    /// Fetch every resource matching `filter`, in natural order
    async fn get_resources(&self, filter: &Self::Filter) -> Vec<Self::Resource>;

    /// Look up one resource without reporting anything
    async fn find_resource(&self, id: &str) -> Option<Self::Resource>;

    /// The value behind a to-one relationship of `resource`
    fn related<'a>(
        &self,
        _resource: &'a Self::Resource,
        _relationship: &str,
    ) -> Option<&'a (dyn Any + Send + Sync)> {
        None
    }
}

/// Write-side hooks of a resource type
#[async_trait]
pub trait WritableController: ResourceController {
    /// A resource being populated from submitted data
    type Draft: Send + Sync;

    /// A resolved relationship value
    type Related: Send + Sync;

    fn new_draft(&self) -> Self::Draft;

    fn draft_from(&self, resource: Self::Resource) -> Self::Draft;

    /// Id of a stored resource that saving `draft` on create would
    /// overwrite; `None` when there is none or it cannot be known yet
    async fn existing_id(&self, _draft: &Self::Draft) -> Option<String> {
        None
    }

    /// Check a submitted attribute before it is applied
    fn process_attribute(
        &self,
        _draft: &Self::Draft,
        _attribute: &str,
        _value: &Value,
        _errors: &mut ErrorScope<'_>,
    ) -> bool {
        true
    }

    fn apply_attribute(&self, draft: &mut Self::Draft, attribute: &str, value: Value);

    /// Check submitted linkage before it is resolved
    ///
    /// Rejects empty linkage by default.
    fn process_relationship(
        &self,
        _draft: &Self::Draft,
        relationship: &str,
        linkage: &Linkage,
        errors: &mut ErrorScope<'_>,
    ) -> bool {
        if linkage.is_empty() {
            errors.relationship_validation(relationship, "cannot be empty");
            return false;
        }

        true
    }

    /// Resolve the target of a relationship by id
    async fn get_relationship(&self, relationship: &str, id: &str) -> Option<Self::Related>;

    /// Check a resolved relationship value before it is applied
    fn process_relationship_data(
        &self,
        _draft: &Self::Draft,
        _relationship: &str,
        _value: Option<&Self::Related>,
        _errors: &mut ErrorScope<'_>,
    ) -> bool {
        true
    }

    fn apply_relationship(
        &self,
        draft: &mut Self::Draft,
        relationship: &str,
        value: Option<Self::Related>,
    );

    /// Structural validation once attributes and relationships are applied
    ///
    /// Records every violation; never stops at the first one.
    fn validate_resource(&self, draft: &Self::Draft, errors: &mut ErrorScope<'_>);

    /// Persist a validated draft
    ///
    /// A returned error is recorded for the item being written.
    async fn save_resource(&self, draft: Self::Draft) -> Result<Self::Resource, ErrorObject>;

    async fn delete_resource(&self, resource: Self::Resource) -> Result<(), ErrorObject>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Create,
    Update,
}

/// Generic orchestrator for one resource type
pub struct ResourceEndpoint<C> {
    api: Arc<JsonApi>,
    controller: C,
    observer: Arc<dyn Observer>,
}

impl<C: ResourceController> ResourceEndpoint<C> {
    pub fn new(api: Arc<JsonApi>, controller: C, observer: Arc<dyn Observer>) -> Self {
        Self {
            api,
            controller,
            observer,
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    fn resource_type(&self) -> &'static str {
        self.controller.definition().resource_type
    }

    /// A fresh document for one request
    pub fn document(&self, query: JsonApiQuery) -> Document {
        Document::new(self.api.clone(), query)
    }

    /// Build the sorter, recording fields outside the whitelist
    pub fn create_sorter(&self, query: &JsonApiQuery, document: &mut Document) -> Sorter {
        let definition = self.controller.definition();
        let (sorter, rejected) = Sorter::parse(query.sort(), definition.sort_fields);

        for field in rejected {
            document.add_error(ErrorObject::sort_field_not_found(
                definition.resource_type,
                &field,
            ));
        }

        sorter
    }

    /// Filtered, sorted and paginated resources
    ///
    /// `None` when any error was recorded; the document then reports only
    /// its errors.
    pub async fn list(
        &self,
        query: &JsonApiQuery,
        document: &mut Document,
    ) -> Option<Page<C::Resource>> {
        let filter = self.controller.resolve_filters(query, document);
        let sorter = self.create_sorter(query, document);

        if document.has_errors() {
            tracing::debug!(
                resource_type = self.resource_type(),
                errors = document.errors().len(),
                "index aborted before fetching"
            );
            return None;
        }

        let mut items = self.controller.get_resources(&filter).await;
        sorter.sort(&mut items);

        let total = items.len();
        let offset = query.offset();
        let limit = query.limit(self.api.max_limit());
        let items: Vec<C::Resource> = items.into_iter().skip(offset).take(limit).collect();

        tracing::debug!(
            resource_type = self.resource_type(),
            total,
            offset,
            limit,
            returned = items.len(),
            "index"
        );

        Some(Page {
            items,
            total,
            offset,
            limit,
        })
    }

    /// Resolve `id`, recording a not-found error at `index` when absent
    pub async fn get_resource(
        &self,
        id: &str,
        document: &mut Document,
        index: Option<usize>,
    ) -> Option<C::Resource> {
        let resource = self.controller.find_resource(id).await;
        if resource.is_none() {
            document.add_error(ErrorObject::resource_not_found(self.resource_type(), id).at(index));
        }

        resource
    }

    /// Render a resource through the adapter registered for this type
    pub fn render(
        &self,
        resource: &C::Resource,
        document: &Document,
    ) -> Result<Option<ResourceObject>, AdapterError> {
        let adapter = document.api().get_resource_adapter(self.resource_type())?;
        adapter.get_resource(Some(resource as &dyn Any), document, None)
    }

    /// GET collection
    pub async fn index(&self, query: JsonApiQuery) -> Result<Document, AdapterError> {
        let mut document = self.document(query.clone());

        let Some(page) = self.list(&query, &mut document).await else {
            return Ok(document);
        };

        let mut resources = Vec::with_capacity(page.items.len());
        for item in &page.items {
            if let Some(resource) = self.render(item, &document)? {
                resources.push(resource);
            }
        }

        document.set_data(PrimaryData::Collection(resources));
        document.set_meta("total", json!(page.total));
        document.set_meta("offset", json!(page.offset));
        document.set_meta("limit", json!(page.limit));

        Ok(document)
    }

    /// GET single resource
    pub async fn detail(&self, id: &str, query: JsonApiQuery) -> Result<Document, AdapterError> {
        let mut document = self.document(query);

        if let Some(resource) = self.get_resource(id, &mut document, None).await {
            let rendered = self.render(&resource, &document)?;
            document.set_data(PrimaryData::Resource(rendered));
        }

        Ok(document)
    }

    fn relationship_target(
        &self,
        relationship: &str,
        document: &mut Document,
    ) -> Option<&'static str> {
        let target = self
            .controller
            .definition()
            .relationship(relationship)
            .map(|r| r.target_type);

        if target.is_none() {
            document.add_error(ErrorObject::relationship_not_found(
                self.resource_type(),
                relationship,
            ));
        }

        target
    }

    fn render_related(
        &self,
        id: &str,
        relationship: &str,
        target_type: &str,
        resource: &C::Resource,
        document: &Document,
    ) -> Result<Option<ResourceObject>, AdapterError> {
        let Some(value) = self.controller.related(resource, relationship) else {
            self.observer.data_quality(
                self.resource_type(),
                id,
                &format!("relationship '{}' has no target", relationship),
            );
            return Ok(None);
        };

        let adapter = document.api().get_resource_adapter(target_type)?;
        adapter.get_resource(Some(value as &dyn Any), document, None)
    }

    /// GET the full target of a relationship
    pub async fn related(
        &self,
        id: &str,
        relationship: &str,
        query: JsonApiQuery,
    ) -> Result<Document, AdapterError> {
        let mut document = self.document(query);

        let Some(target_type) = self.relationship_target(relationship, &mut document) else {
            return Ok(document);
        };
        let Some(resource) = self.get_resource(id, &mut document, None).await else {
            return Ok(document);
        };

        let related = self.render_related(id, relationship, target_type, &resource, &document)?;
        document.set_data(PrimaryData::Resource(related));

        Ok(document)
    }

    /// GET the linkage of a relationship
    pub async fn relationship(
        &self,
        id: &str,
        relationship: &str,
        query: JsonApiQuery,
    ) -> Result<Document, AdapterError> {
        let mut document = self.document(query);

        let Some(target_type) = self.relationship_target(relationship, &mut document) else {
            return Ok(document);
        };
        let Some(resource) = self.get_resource(id, &mut document, None).await else {
            return Ok(document);
        };

        let linkage = self
            .render_related(id, relationship, target_type, &resource, &document)?
            .map(|r| r.identifier());
        self.set_relationship_links(id, relationship, &mut document);
        document.set_data(PrimaryData::Linkage(linkage));

        Ok(document)
    }

    fn set_relationship_links(&self, id: &str, relationship: &str, document: &mut Document) {
        let params = [("id", id), ("relationship", relationship)];
        let routes = [
            ("self", format!("api.{}.relationship", self.resource_type())),
            ("related", format!("api.{}.related", self.resource_type())),
        ];

        for (name, route) in routes {
            if let Ok(url) = self.api.url(&route, &params) {
                document.set_link(name, url);
            }
        }
    }
}

impl<C: WritableController> ResourceEndpoint<C> {
    /// Parse one submitted item and check its type
    fn parse_item(
        &self,
        value: &Value,
        index: Option<usize>,
        document: &mut Document,
    ) -> Option<ResourceData> {
        let data = match ResourceData::from_value(value) {
            Ok(data) => data,
            Err(message) => {
                document.add_error(ErrorObject::invalid_document(message).at(index));
                return None;
            }
        };

        if data.resource_type != self.resource_type() {
            document.add_error(
                ErrorObject::type_mismatch(self.resource_type(), &data.resource_type).at(index),
            );
            return None;
        }

        Some(data)
    }

    /// Run the relationship hooks for one submitted linkage
    async fn apply_linkage(
        &self,
        draft: &mut C::Draft,
        relationship: &str,
        linkage: &Linkage,
        index: Option<usize>,
        document: &mut Document,
    ) -> bool {
        let resource_type = self.resource_type();
        let Some(definition) = self.controller.definition().relationship(relationship) else {
            ErrorScope::new(document, resource_type, index)
                .relationship_validation(relationship, "is not supported");
            return false;
        };

        let mut scope = ErrorScope::new(document, resource_type, index);
        if !self
            .controller
            .process_relationship(draft, relationship, linkage, &mut scope)
        {
            return false;
        }

        let value = match linkage {
            Linkage::One(identifier) if identifier.resource_type != definition.target_type => {
                scope.relationship_validation(
                    relationship,
                    &format!("should reference {}", definition.target_type),
                );
                return false;
            }
            Linkage::One(identifier) => {
                self.controller
                    .get_relationship(relationship, &identifier.id)
                    .await
            }
            Linkage::Null | Linkage::Many(_) => None,
        };

        let mut scope = ErrorScope::new(document, resource_type, index);
        if !self
            .controller
            .process_relationship_data(draft, relationship, value.as_ref(), &mut scope)
        {
            return false;
        }

        self.controller.apply_relationship(draft, relationship, value);
        true
    }

    /// Validate and save a populated draft
    async fn finish(
        &self,
        draft: C::Draft,
        index: Option<usize>,
        document: &mut Document,
    ) -> Option<C::Resource> {
        let mut scope = ErrorScope::new(document, self.resource_type(), index);
        self.controller.validate_resource(&draft, &mut scope);

        if scope.has_errors() {
            return None;
        }

        match self.controller.save_resource(draft).await {
            Ok(resource) => Some(resource),
            Err(error) => {
                document.add_error(error.at(index));
                None
            }
        }
    }

    /// Create or update one submitted resource
    ///
    /// Errors are recorded at `index`; nothing is saved when any error was
    /// recorded for that index.
    async fn write_item(
        &self,
        value: &Value,
        route_id: Option<&str>,
        mode: WriteMode,
        index: Option<usize>,
        document: &mut Document,
    ) -> Option<C::Resource> {
        let resource_type = self.resource_type();
        let data = self.parse_item(value, index, document)?;

        let mut draft = match mode {
            WriteMode::Create => self.controller.new_draft(),
            WriteMode::Update => {
                let id = match (route_id, data.id.as_deref()) {
                    (Some(route_id), Some(id)) if route_id != id => {
                        document.add_error(
                            ErrorObject::invalid_document(format!(
                                "id '{}' does not match the requested resource '{}'",
                                id, route_id
                            ))
                            .at(index),
                        );
                        return None;
                    }
                    (Some(id), _) | (None, Some(id)) => id,
                    (None, None) => {
                        document.add_error(
                            ErrorObject::invalid_document("resource id is required").at(index),
                        );
                        return None;
                    }
                };

                let existing = self.get_resource(id, document, index).await?;
                self.controller.draft_from(existing)
            }
        };

        for (attribute, value) in data.attributes {
            let mut scope = ErrorScope::new(document, resource_type, index);
            if !self.controller.definition().has_attribute(&attribute) {
                scope.attribute_validation(&attribute, "is not supported");
                continue;
            }

            if self
                .controller
                .process_attribute(&draft, &attribute, &value, &mut scope)
            {
                self.controller.apply_attribute(&mut draft, &attribute, value);
            }
        }

        for (relationship, value) in &data.relationships {
            match Linkage::from_relationship(value) {
                Ok(linkage) => {
                    self.apply_linkage(&mut draft, relationship, &linkage, index, document)
                        .await;
                }
                Err(message) => {
                    ErrorScope::new(document, resource_type, index)
                        .relationship_validation(relationship, &message);
                }
            }
        }

        if mode == WriteMode::Create {
            if let Some(id) = self.controller.existing_id(&draft).await {
                document.add_error(ErrorObject::data_exists(resource_type, &id).at(index));
                return None;
            }
        }

        self.finish(draft, index, document).await
    }

    async fn write_many(
        &self,
        items: &[Value],
        mode: WriteMode,
        document: &mut Document,
    ) -> Vec<ItemOutcome<C::Resource>> {
        let mut outcomes = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let outcome = match self.write_item(item, None, mode, Some(index), document).await {
                Some(resource) => ItemOutcome::Success(resource),
                None => ItemOutcome::Failure(document.errors_at(Some(index))),
            };

            tracing::debug!(
                resource_type = self.resource_type(),
                index,
                success = outcome.is_success(),
                "bulk item processed"
            );
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Create every submitted resource; one failure does not stop the others
    pub async fn create_many(
        &self,
        items: &[Value],
        document: &mut Document,
    ) -> Vec<ItemOutcome<C::Resource>> {
        self.write_many(items, WriteMode::Create, document).await
    }

    /// Update every submitted resource; each item carries its own id
    pub async fn update_many(
        &self,
        items: &[Value],
        document: &mut Document,
    ) -> Vec<ItemOutcome<C::Resource>> {
        self.write_many(items, WriteMode::Update, document).await
    }

    /// Delete every identified resource; one failure does not stop the others
    pub async fn delete_many(
        &self,
        items: &[Value],
        document: &mut Document,
    ) -> Vec<ItemOutcome<ResourceIdentifier>> {
        let mut outcomes = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let deleted = self.delete_item(item, index, document).await;
            outcomes.push(match deleted {
                Some(identifier) => ItemOutcome::Success(identifier),
                None => ItemOutcome::Failure(document.errors_at(Some(index))),
            });
        }

        outcomes
    }

    async fn delete_item(
        &self,
        item: &Value,
        index: usize,
        document: &mut Document,
    ) -> Option<ResourceIdentifier> {
        let identifier: ResourceIdentifier = match serde_json::from_value(item.clone()) {
            Ok(identifier) => identifier,
            Err(e) => {
                document.add_error(
                    ErrorObject::invalid_document(format!("invalid resource identifier: {}", e))
                        .at(Some(index)),
                );
                return None;
            }
        };

        if identifier.resource_type != self.resource_type() {
            document.add_error(
                ErrorObject::type_mismatch(self.resource_type(), &identifier.resource_type)
                    .at(Some(index)),
            );
            return None;
        }

        let resource = self
            .get_resource(&identifier.id, document, Some(index))
            .await?;
        if let Err(error) = self.controller.delete_resource(resource).await {
            document.add_error(error.at(Some(index)));
            return None;
        }

        Some(identifier)
    }

    /// Split a submitted body into its `data` member
    ///
    /// Arrays are only accepted when the resource supports bulk writes.
    fn body_data<'a>(&self, body: &'a Value, document: &mut Document) -> Option<&'a Value> {
        let Some(data) = body.get("data") else {
            document.add_error(ErrorObject::invalid_document("document has no data member"));
            return None;
        };

        if data.is_array() && !self.controller.definition().bulk {
            document.add_error(ErrorObject::invalid_document(format!(
                "bulk operations are not supported for {}",
                self.resource_type()
            )));
            return None;
        }

        Some(data)
    }

    fn render_outcomes<T>(
        &self,
        outcomes: &[ItemOutcome<T>],
        document: &mut Document,
        render: impl Fn(&T, &Document) -> Result<Option<ResourceObject>, AdapterError>,
    ) -> Result<(), AdapterError> {
        let mut rendered = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            rendered.push(match outcome {
                ItemOutcome::Success(value) => render(value, &*document)?,
                ItemOutcome::Failure(_) => None,
            });
        }

        document.set_data(PrimaryData::Bulk(rendered));
        Ok(())
    }

    /// POST a resource, or an array of resources in bulk mode
    pub async fn create(&self, body: &Value, query: JsonApiQuery) -> Result<Document, AdapterError> {
        let mut document = self.document(query);
        let Some(data) = self.body_data(body, &mut document) else {
            return Ok(document);
        };

        if let Some(items) = data.as_array() {
            let outcomes = self.create_many(items, &mut document).await;
            self.render_outcomes(&outcomes, &mut document, |r, d| self.render(r, d))?;
            document.set_status(StatusCode::CREATED);
            return Ok(document);
        }

        if let Some(resource) = self
            .write_item(data, None, WriteMode::Create, None, &mut document)
            .await
        {
            let rendered = self.render(&resource, &document)?;
            document.set_data(PrimaryData::Resource(rendered));
            document.set_status(StatusCode::CREATED);
        }

        Ok(document)
    }

    /// PATCH a resource, or an array of resources in bulk mode
    ///
    /// `id` is the resource addressed by the route; bulk items carry their
    /// own ids.
    pub async fn update(
        &self,
        id: Option<&str>,
        body: &Value,
        query: JsonApiQuery,
    ) -> Result<Document, AdapterError> {
        let mut document = self.document(query);
        let Some(data) = self.body_data(body, &mut document) else {
            return Ok(document);
        };

        if let Some(items) = data.as_array() {
            let outcomes = self.update_many(items, &mut document).await;
            self.render_outcomes(&outcomes, &mut document, |r, d| self.render(r, d))?;
            return Ok(document);
        }

        if let Some(resource) = self
            .write_item(data, id, WriteMode::Update, None, &mut document)
            .await
        {
            let rendered = self.render(&resource, &document)?;
            document.set_data(PrimaryData::Resource(rendered));
        }

        Ok(document)
    }

    /// DELETE a single resource
    pub async fn delete(&self, id: &str, query: JsonApiQuery) -> Result<Document, AdapterError> {
        let mut document = self.document(query);

        if let Some(resource) = self.get_resource(id, &mut document, None).await {
            match self.controller.delete_resource(resource).await {
                Ok(()) => document.set_status(StatusCode::NO_CONTENT),
                Err(error) => document.add_error(error),
            }
        }

        Ok(document)
    }

    /// DELETE the resources identified by the submitted array
    pub async fn delete_bulk(
        &self,
        body: &Value,
        query: JsonApiQuery,
    ) -> Result<Document, AdapterError> {
        let mut document = self.document(query);
        let Some(data) = self.body_data(body, &mut document) else {
            return Ok(document);
        };

        let Some(items) = data.as_array() else {
            document.add_error(ErrorObject::invalid_document(
                "bulk delete expects an array of resource identifiers",
            ));
            return Ok(document);
        };

        let outcomes = self.delete_many(items, &mut document).await;
        self.render_outcomes(&outcomes, &mut document, |identifier, _| {
            Ok(Some(ResourceObject::new(
                &identifier.resource_type,
                &identifier.id,
                None,
            )))
        })?;

        Ok(document)
    }

    /// PATCH the linkage of a relationship
    pub async fn update_relationship(
        &self,
        id: &str,
        relationship: &str,
        body: &Value,
        query: JsonApiQuery,
    ) -> Result<Document, AdapterError> {
        let mut document = self.document(query);

        let Some(target_type) = self.relationship_target(relationship, &mut document) else {
            return Ok(document);
        };

        let linkage = match Linkage::from_relationship(body) {
            Ok(linkage) => linkage,
            Err(message) => {
                document.add_error(ErrorObject::invalid_document(message));
                return Ok(document);
            }
        };

        let Some(existing) = self.get_resource(id, &mut document, None).await else {
            return Ok(document);
        };

        let mut draft = self.controller.draft_from(existing);
        if !self
            .apply_linkage(&mut draft, relationship, &linkage, None, &mut document)
            .await
        {
            return Ok(document);
        }

        let Some(saved) = self.finish(draft, None, &mut document).await else {
            return Ok(document);
        };

        let saved_id = self
            .render(&saved, &document)?
            .map(|r| r.id().to_string())
            .unwrap_or_else(|| id.to_string());
        let linkage = self
            .render_related(&saved_id, relationship, target_type, &saved, &document)?
            .map(|r| r.identifier());
        self.set_relationship_links(&saved_id, relationship, &mut document);
        document.set_data(PrimaryData::Linkage(linkage));

        Ok(document)
    }
}
