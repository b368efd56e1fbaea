// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::Repository;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub trait PersistableData: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}
impl<T> PersistableData for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// This trait enables the self type to report a state snapshot
pub trait Snapshot
where
    Self: Sized,
{
    type Snapshot: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Result<Self::Snapshot>;
}

/// This trait enables the self type to checkpoint its state to a repository
pub trait Checkpoint: Snapshot {
    fn repository(&self) -> &Repository<Self::Snapshot>;

    fn checkpoint(&self) {
        let Ok(snapshot) = self.snapshot() else {
            return;
        };
        self.repository().write(&snapshot);
    }

    fn clear_checkpoint(&self) {
        self.repository().clear()
    }
}

/// AutoPersist enables a repository to generate a persistable container
#[async_trait]
pub trait AutoPersist<T>
where
    T: PersistableData,
{
    /// Load the data from the repository into an auto persist container
    async fn load(&self) -> Result<Persistable<T>>;
    /// Create a new auto persist container and set some data on it to send back to the repository
    fn send(&self, data: Option<T>) -> Persistable<T>;
    /// Load the data from the repository or persist the given default
    async fn load_or_default(&self, default: T) -> Result<Persistable<T>>;
    /// Load the data from the repository or persist the callback's result
    async fn load_or_else<F>(&self, f: F) -> Result<Persistable<T>>
    where
        F: Send + FnOnce() -> Result<T>;
}

#[async_trait]
impl<T> AutoPersist<T> for Repository<T>
where
    T: PersistableData,
{
    async fn load(&self) -> Result<Persistable<T>> {
        Persistable::load(self).await
    }

    fn send(&self, data: Option<T>) -> Persistable<T> {
        Persistable::new(data, self).save()
    }

    async fn load_or_default(&self, default: T) -> Result<Persistable<T>> {
        Persistable::load_or_default(self, default).await
    }

    async fn load_or_else<F>(&self, f: F) -> Result<Persistable<T>>
    where
        F: Send + FnOnce() -> Result<T>,
    {
        Persistable::load_or_else(self, f).await
    }
}

/// A container that automatically persists its content every time it is
/// mutated or changed.
#[derive(Debug)]
pub struct Persistable<T> {
    data: Option<T>,
    repo: Repository<T>,
}

impl<T> Persistable<T>
where
    T: PersistableData,
{
    pub fn new(data: Option<T>, repo: &Repository<T>) -> Self {
        Self {
            data,
            repo: repo.clone(),
        }
    }

    /// Load data from the repository to the container
    pub async fn load(repo: &Repository<T>) -> Result<Self> {
        let data = repo.read().await?;

        Ok(Self::new(data, repo))
    }

    /// Load the data from the repo or save and sync the given default value
    pub async fn load_or_default(repo: &Repository<T>, default: T) -> Result<Self> {
        let instance = Self::new(Some(repo.read().await?.unwrap_or(default)), repo);

        Ok(instance.save())
    }

    /// Load the data from the repo or save and sync the result of the callback
    pub async fn load_or_else<F>(repo: &Repository<T>, f: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T>,
    {
        let data = repo
            .read()
            .await?
            .ok_or_else(|| anyhow!("Not found"))
            .or_else(|_| f())?;

        let instance = Self::new(Some(data), repo);
        Ok(instance.save())
    }

    /// Write the current content through to the repository
    pub fn save(self) -> Self {
        self.checkpoint();
        self
    }

    /// Mutate the content if it is available or return an error if either the
    /// mutator function fails or the data has not been set. A failed mutation
    /// leaves both the container and the repository untouched.
    pub fn try_mutate<F>(&mut self, mutator: F) -> Result<()>
    where
        F: FnOnce(T) -> Result<T>,
    {
        let content = self.data.clone().ok_or(anyhow!("Data has not been set"))?;
        self.data = Some(mutator(content)?);
        self.checkpoint();
        Ok(())
    }

    /// Set the data on both the persistable and the repository.
    pub fn set(&mut self, data: T) {
        self.data = Some(data);
        self.checkpoint();
    }

    /// Clear the data from both the persistable and the repository.
    pub fn clear(&mut self) {
        self.data = None;
        self.clear_checkpoint();
    }

    pub fn get(&self) -> Option<T> {
        self.data.clone()
    }

    pub fn try_get(&self) -> Result<T> {
        self.data
            .clone()
            .ok_or(anyhow!("Data was not set on container."))
    }

    pub fn has(&self) -> bool {
        self.data.is_some()
    }

    /// Run a closure over a reference to the data, erroring when unset
    pub fn try_with<F, U>(&self, f: F) -> Result<U>
    where
        F: FnOnce(&T) -> Result<U>,
    {
        match &self.data {
            Some(data) => f(data),
            None => Err(anyhow!("Data was not set on container.")),
        }
    }
}

impl<T> Snapshot for Persistable<T>
where
    T: PersistableData,
{
    type Snapshot = T;
    fn snapshot(&self) -> Result<Self::Snapshot> {
        self.data
            .clone()
            .ok_or(anyhow!("No data stored on container"))
    }
}

impl<T> Checkpoint for Persistable<T>
where
    T: PersistableData,
{
    fn repository(&self) -> &Repository<Self::Snapshot> {
        &self.repo
    }
}
