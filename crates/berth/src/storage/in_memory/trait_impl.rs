//! `CatalogStorage` implementation for the in-memory backend.

use super::InMemoryStorage;
use crate::domain::{
    CatalogSnapshot, Dependency, EntityKind, NewOwner, NewService, NewSystem, Owner, OwnerId,
    Service, ServiceFilter, ServiceId, ServiceUpdate, System, SystemId,
};
use crate::error::{Error, Result};
use crate::storage::CatalogStorage;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl CatalogStorage for InMemoryStorage {
    // ========== Service CRUD ==========

    async fn create_service(&mut self, new_service: NewService) -> Result<Service> {
        let mut inner = self.lock().await;

        let id = inner.generate_id(
            EntityKind::Service,
            &new_service.name,
            &new_service.description,
        )?;
        let now = Utc::now();

        let service = Service {
            id: ServiceId::new(id),
            name: new_service.name.trim().to_string(),
            description: new_service.description,
            system: new_service.system,
            owner: new_service.owner,
            lifecycle: new_service.lifecycle,
            depends_on: new_service.depends_on,
            apis: new_service.apis,
            tags: new_service.tags,
            created_at: now,
            updated_at: now,
        };
        service.validate().map_err(Error::Storage)?;

        inner.services.insert(service.id.clone(), service.clone());
        tracing::debug!(id = %service.id, name = %service.name, "created service");
        Ok(service)
    }

    async fn get_service(&self, id: &ServiceId) -> Result<Option<Service>> {
        let inner = self.lock().await;
        Ok(inner.services.get(id).cloned())
    }

    async fn update_service(&mut self, id: &ServiceId, updates: ServiceUpdate) -> Result<Service> {
        let mut inner = self.lock().await;

        let current = inner
            .services
            .get(id)
            .ok_or_else(|| Error::ServiceNotFound(id.clone()))?;

        let mut updated = current.clone();
        if let Some(name) = updates.name {
            updated.name = name.trim().to_string();
        }
        if let Some(description) = updates.description {
            updated.description = description;
        }
        if let Some(system) = updates.system {
            updated.system = system;
        }
        if let Some(owner) = updates.owner {
            updated.owner = owner;
        }
        if let Some(lifecycle) = updates.lifecycle {
            updated.lifecycle = lifecycle;
        }
        if let Some(tags) = updates.tags {
            updated.tags = tags;
        }
        updated.updated_at = Utc::now();
        updated.validate().map_err(Error::Storage)?;

        inner.services.insert(id.clone(), updated.clone());
        Ok(updated)
    }

    async fn delete_service(&mut self, id: &ServiceId) -> Result<()> {
        let mut inner = self.lock().await;

        // Other services' edges to this id are left alone: they become
        // dangling references for lint to report.
        inner
            .services
            .remove(id)
            .ok_or_else(|| Error::ServiceNotFound(id.clone()))?;
        tracing::debug!(id = %id, "deleted service");
        Ok(())
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>> {
        let inner = self.lock().await;

        let mut services: Vec<Service> = inner
            .services
            .values()
            .filter(|service| {
                filter
                    .system
                    .as_ref()
                    .is_none_or(|system| service.system.as_ref() == Some(system))
                    && filter
                        .owner
                        .as_ref()
                        .is_none_or(|owner| service.owner.as_ref() == Some(owner))
                    && filter
                        .lifecycle
                        .is_none_or(|lifecycle| service.lifecycle == Some(lifecycle))
                    && filter
                        .tag
                        .as_ref()
                        .is_none_or(|tag| service.tags.iter().any(|t| t == tag))
            })
            .cloned()
            .collect();

        services.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        if let Some(limit) = filter.limit {
            services.truncate(limit);
        }

        Ok(services)
    }

    // ========== System CRUD ==========

    async fn create_system(&mut self, new_system: NewSystem) -> Result<System> {
        let mut inner = self.lock().await;

        let id = inner.generate_id(
            EntityKind::System,
            &new_system.name,
            &new_system.description,
        )?;
        let now = Utc::now();

        let system = System {
            id: SystemId::new(id),
            name: new_system.name.trim().to_string(),
            description: new_system.description,
            owner: new_system.owner,
            created_at: now,
            updated_at: now,
        };
        system.validate().map_err(Error::Storage)?;

        inner.systems.insert(system.id.clone(), system.clone());
        Ok(system)
    }

    async fn get_system(&self, id: &SystemId) -> Result<Option<System>> {
        let inner = self.lock().await;
        Ok(inner.systems.get(id).cloned())
    }

    async fn delete_system(&mut self, id: &SystemId) -> Result<()> {
        let mut inner = self.lock().await;
        inner
            .systems
            .remove(id)
            .ok_or_else(|| Error::SystemNotFound(id.clone()))?;
        Ok(())
    }

    async fn list_systems(&self) -> Result<Vec<System>> {
        let inner = self.lock().await;
        let mut systems: Vec<System> = inner.systems.values().cloned().collect();
        systems.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(systems)
    }

    // ========== Owner CRUD ==========

    async fn create_owner(&mut self, new_owner: NewOwner) -> Result<Owner> {
        let mut inner = self.lock().await;

        let id = inner.generate_id(EntityKind::Owner, &new_owner.name, &new_owner.description)?;
        let now = Utc::now();

        let owner = Owner {
            id: OwnerId::new(id),
            name: new_owner.name.trim().to_string(),
            description: new_owner.description,
            created_at: now,
            updated_at: now,
        };
        owner.validate().map_err(Error::Storage)?;

        inner.owners.insert(owner.id.clone(), owner.clone());
        Ok(owner)
    }

    async fn get_owner(&self, id: &OwnerId) -> Result<Option<Owner>> {
        let inner = self.lock().await;
        Ok(inner.owners.get(id).cloned())
    }

    async fn delete_owner(&mut self, id: &OwnerId) -> Result<()> {
        let mut inner = self.lock().await;
        inner
            .owners
            .remove(id)
            .ok_or_else(|| Error::OwnerNotFound(id.clone()))?;
        Ok(())
    }

    async fn list_owners(&self) -> Result<Vec<Owner>> {
        let inner = self.lock().await;
        let mut owners: Vec<Owner> = inner.owners.values().cloned().collect();
        owners.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(owners)
    }

    // ========== Dependency edges ==========

    async fn add_dependency(&mut self, from: &ServiceId, dep: Dependency) -> Result<Service> {
        let mut inner = self.lock().await;

        let service = inner
            .services
            .get_mut(from)
            .ok_or_else(|| Error::ServiceNotFound(from.clone()))?;

        // The target is stored verbatim. Self-dependencies, unknown ids, and
        // edges that close a cycle are all representable catalog states.
        service.depends_on.push(dep);
        service.updated_at = Utc::now();

        Ok(service.clone())
    }

    async fn remove_dependency(&mut self, from: &ServiceId, to: &ServiceId) -> Result<Service> {
        let mut inner = self.lock().await;

        let service = inner
            .services
            .get_mut(from)
            .ok_or_else(|| Error::ServiceNotFound(from.clone()))?;

        let before = service.depends_on.len();
        service.depends_on.retain(|dep| dep.service != *to);

        if service.depends_on.len() == before {
            return Err(Error::DependencyNotFound {
                from: from.clone(),
                to: to.clone(),
            });
        }

        service.updated_at = Utc::now();
        Ok(service.clone())
    }

    // ========== Snapshots and batch ==========

    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let inner = self.lock().await;

        let mut services: Vec<Service> = inner.services.values().cloned().collect();
        services.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut systems: Vec<System> = inner.systems.values().cloned().collect();
        systems.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut owners: Vec<Owner> = inner.owners.values().cloned().collect();
        owners.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(CatalogSnapshot {
            services,
            systems,
            owners,
        })
    }

    async fn import_services(&mut self, services: Vec<Service>) -> Result<usize> {
        let mut inner = self.lock().await;
        let count = services.len();

        for service in services {
            service.validate().map_err(Error::Storage)?;
            inner.id_generator.register_id(service.id.as_str().to_string());
            inner.services.insert(service.id.clone(), service);
        }

        Ok(count)
    }

    // ========== Persistence ==========

    async fn save(&self) -> Result<()> {
        // Purely in-memory: nothing to persist.
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        // Purely in-memory: no backing store to reload from.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::new_in_memory_storage;
    use super::*;
    use crate::domain::Lifecycle;

    fn new_service(name: &str) -> NewService {
        NewService {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn edge(target: &str) -> Dependency {
        Dependency {
            service: ServiceId::new(target),
            api: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let mut storage = new_in_memory_storage();
        let created = storage.create_service(new_service("payments")).await.unwrap();

        assert!(created.id.as_str().starts_with("svc-"));
        let fetched = storage.get_service(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "payments");
    }

    #[tokio::test]
    async fn create_rejects_empty_name() {
        let mut storage = new_in_memory_storage();
        let result = storage.create_service(new_service("   ")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_applies_only_provided_fields() {
        let mut storage = new_in_memory_storage();
        let created = storage.create_service(new_service("payments")).await.unwrap();

        let updated = storage
            .update_service(
                &created.id,
                ServiceUpdate {
                    lifecycle: Some(Some(Lifecycle::Production)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "payments", "name must be untouched");
        assert_eq!(updated.lifecycle, Some(Lifecycle::Production));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_service_fails() {
        let mut storage = new_in_memory_storage();
        let result = storage
            .update_service(&ServiceId::new("svc-none"), ServiceUpdate::default())
            .await;
        assert!(matches!(result, Err(Error::ServiceNotFound(_))));
    }

    #[tokio::test]
    async fn delete_leaves_inbound_edges_dangling() {
        let mut storage = new_in_memory_storage();
        let target = storage.create_service(new_service("auth")).await.unwrap();
        let declarer = storage.create_service(new_service("gateway")).await.unwrap();
        storage
            .add_dependency(&declarer.id, edge(target.id.as_str()))
            .await
            .unwrap();

        storage.delete_service(&target.id).await.unwrap();

        let after = storage.get_service(&declarer.id).await.unwrap().unwrap();
        assert_eq!(
            after.depends_on.len(),
            1,
            "the edge must survive as a dangling reference for lint"
        );
    }

    #[tokio::test]
    async fn add_dependency_accepts_unknown_target() {
        let mut storage = new_in_memory_storage();
        let svc = storage.create_service(new_service("checkout")).await.unwrap();

        let updated = storage
            .add_dependency(&svc.id, edge("ghost-service"))
            .await
            .unwrap();
        assert_eq!(updated.depends_on[0].service.as_str(), "ghost-service");
    }

    #[tokio::test]
    async fn add_dependency_accepts_self_loop_and_cycles() {
        let mut storage = new_in_memory_storage();
        let a = storage.create_service(new_service("a")).await.unwrap();
        let b = storage.create_service(new_service("b")).await.unwrap();

        storage
            .add_dependency(&a.id, edge(a.id.as_str()))
            .await
            .expect("self-loop is a valid stored state");
        storage
            .add_dependency(&a.id, edge(b.id.as_str()))
            .await
            .unwrap();
        storage
            .add_dependency(&b.id, edge(a.id.as_str()))
            .await
            .expect("cycle-closing edge is a valid stored state");
    }

    #[tokio::test]
    async fn remove_dependency_requires_an_existing_edge() {
        let mut storage = new_in_memory_storage();
        let a = storage.create_service(new_service("a")).await.unwrap();
        let b = storage.create_service(new_service("b")).await.unwrap();

        let result = storage.remove_dependency(&a.id, &b.id).await;
        assert!(matches!(result, Err(Error::DependencyNotFound { .. })));

        storage.add_dependency(&a.id, edge(b.id.as_str())).await.unwrap();
        let updated = storage.remove_dependency(&a.id, &b.id).await.unwrap();
        assert!(updated.depends_on.is_empty());
    }

    #[tokio::test]
    async fn list_services_filters_and_orders_by_creation() {
        let mut storage = new_in_memory_storage();
        let first = storage.create_service(new_service("first")).await.unwrap();
        let mut tagged = new_service("second");
        tagged.tags.push("edge".to_string());
        let second = storage.create_service(tagged).await.unwrap();

        let all = storage.list_services(&ServiceFilter::default()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

        let filtered = storage
            .list_services(&ServiceFilter {
                tag: Some("edge".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, second.id);
    }

    #[tokio::test]
    async fn snapshot_contains_all_three_kinds() {
        let mut storage = new_in_memory_storage();
        storage.create_service(new_service("svc")).await.unwrap();
        storage
            .create_system(NewSystem {
                name: "sys".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        storage
            .create_owner(NewOwner {
                name: "own".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let snapshot = storage.snapshot().await.unwrap();
        assert_eq!(snapshot.services.len(), 1);
        assert_eq!(snapshot.systems.len(), 1);
        assert_eq!(snapshot.owners.len(), 1);
    }

    #[tokio::test]
    async fn import_overwrites_matching_ids() {
        let mut storage = new_in_memory_storage();
        let created = storage.create_service(new_service("original")).await.unwrap();

        let mut replacement = created.clone();
        replacement.name = "replacement".to_string();
        let count = storage.import_services(vec![replacement]).await.unwrap();

        assert_eq!(count, 1);
        let fetched = storage.get_service(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "replacement");
    }
}
