//! Owner service: use-cases for managing property owners.

use rentalhub_domain::error::{NotFoundError, RentalError};
use rentalhub_domain::id::UserId;
use rentalhub_domain::owner::{NewOwner, Owner};

use crate::ports::OwnerRepository;

/// Application service for owner CRUD operations.
pub struct OwnerService<R> {
    repo: R,
}

impl<R: OwnerRepository> OwnerService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self, owner), fields(owner_name = %owner.name))]
    pub async fn create_owner(&self, owner: NewOwner) -> Result<Owner, RentalError> {
        self.repo.create(owner).await
    }

    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when no owner with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_owner(&self, id: UserId) -> Result<Owner, RentalError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Owner",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Delete an owner; its properties and their assignments go with it.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::NotFound`] when no owner with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_owner(&self, id: UserId) -> Result<(), RentalError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "Owner",
                id: id.to_string(),
            }
            .into())
        }
    }
}
