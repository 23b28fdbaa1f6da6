use crate::entities;
use crate::errors::AppError;
use crate::settings::Database as DbCfg;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOwner {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub category: String,
    pub owner_id: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub category: String,
    pub owner_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub owner_id: Option<String>,
}

impl From<entities::owner::Model> for Owner {
    fn from(model: entities::owner::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
        }
    }
}

impl From<entities::asset::Model> for Asset {
    fn from(model: entities::asset::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            owner_id: model.owner_id,
            created_at: model.created_at,
        }
    }
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, AppError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

// Owner operations

pub async fn create_owner(db: &DatabaseConnection, input: NewOwner) -> Result<Owner, AppError> {
    if email_taken(db, &input.email, None).await? {
        return Err(AppError::DuplicateEmail);
    }

    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().timestamp();

    let owner = entities::owner::ActiveModel {
        id: Set(id.clone()),
        name: Set(input.name.clone()),
        email: Set(input.email.clone()),
        phone: Set(input.phone.clone()),
        created_at: Set(created_at),
    };

    owner.insert(db).await?;

    Ok(Owner {
        id,
        name: input.name,
        email: input.email,
        phone: input.phone,
        created_at,
    })
}

pub async fn get_owner(db: &DatabaseConnection, id: &str) -> Result<Option<Owner>, AppError> {
    use entities::owner::{Column, Entity};

    let model = Entity::find().filter(Column::Id.eq(id)).one(db).await?;
    Ok(model.map(Owner::from))
}

pub async fn list_owners(
    db: &DatabaseConnection,
    skip: u64,
    limit: u64,
) -> Result<Vec<Owner>, AppError> {
    use entities::owner::{Column, Entity};

    let models = Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?;

    Ok(models.into_iter().map(Owner::from).collect())
}

pub async fn update_owner(
    db: &DatabaseConnection,
    id: &str,
    patch: OwnerPatch,
) -> Result<Option<Owner>, AppError> {
    use entities::owner::{Column, Entity};

    let model = match Entity::find().filter(Column::Id.eq(id)).one(db).await? {
        Some(m) => m,
        None => return Ok(None),
    };

    // Re-check uniqueness for a supplied email, excluding this record
    if let Some(email) = &patch.email {
        if email_taken(db, email, Some(id)).await? {
            return Err(AppError::DuplicateEmail);
        }
    }

    if patch.name.is_none() && patch.email.is_none() && patch.phone.is_none() {
        return Ok(Some(model.into()));
    }

    let mut active: entities::owner::ActiveModel = model.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(email) = patch.email {
        active.email = Set(email);
    }
    if let Some(phone) = patch.phone {
        active.phone = Set(phone);
    }

    let updated = active.update(db).await?;
    Ok(Some(updated.into()))
}

/// Remove an owner and every asset that references it. The two deletes run
/// in one transaction: both happen or neither does.
pub async fn delete_owner(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    use entities::owner::{Column, Entity};

    if Entity::find().filter(Column::Id.eq(id)).one(db).await?.is_none() {
        return Ok(false);
    }

    let txn = db.begin().await?;

    entities::asset::Entity::delete_many()
        .filter(entities::asset::Column::OwnerId.eq(id))
        .exec(&txn)
        .await?;

    Entity::delete_many()
        .filter(Column::Id.eq(id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(true)
}

// Asset operations

/// Insert a new asset. Owner existence has already been checked by the
/// endpoint layer.
pub async fn create_asset(db: &DatabaseConnection, input: NewAsset) -> Result<Asset, AppError> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().timestamp();

    let asset = entities::asset::ActiveModel {
        id: Set(id.clone()),
        name: Set(input.name.clone()),
        category: Set(input.category.clone()),
        owner_id: Set(input.owner_id.clone()),
        created_at: Set(created_at),
    };

    asset.insert(db).await?;

    Ok(Asset {
        id,
        name: input.name,
        category: input.category,
        owner_id: input.owner_id,
        created_at,
    })
}

pub async fn get_asset(db: &DatabaseConnection, id: &str) -> Result<Option<Asset>, AppError> {
    use entities::asset::{Column, Entity};

    let model = Entity::find().filter(Column::Id.eq(id)).one(db).await?;
    Ok(model.map(Asset::from))
}

pub async fn list_assets(
    db: &DatabaseConnection,
    skip: u64,
    limit: u64,
) -> Result<Vec<Asset>, AppError> {
    use entities::asset::{Column, Entity};

    let models = Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?;

    Ok(models.into_iter().map(Asset::from).collect())
}

/// Partial update. A supplied owner id has already been validated by the
/// endpoint layer; absent fields keep their current values.
pub async fn update_asset(
    db: &DatabaseConnection,
    id: &str,
    patch: AssetPatch,
) -> Result<Option<Asset>, AppError> {
    use entities::asset::{Column, Entity};

    let model = match Entity::find().filter(Column::Id.eq(id)).one(db).await? {
        Some(m) => m,
        None => return Ok(None),
    };

    if patch.name.is_none() && patch.category.is_none() && patch.owner_id.is_none() {
        return Ok(Some(model.into()));
    }

    let mut active: entities::asset::ActiveModel = model.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(category) = patch.category {
        active.category = Set(category);
    }
    if let Some(owner_id) = patch.owner_id {
        active.owner_id = Set(owner_id);
    }

    let updated = active.update(db).await?;
    Ok(Some(updated.into()))
}

pub async fn delete_asset(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    use entities::asset::{Column, Entity};

    let result = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

async fn email_taken(
    db: &DatabaseConnection,
    email: &str,
    exclude_id: Option<&str>,
) -> Result<bool, AppError> {
    use entities::owner::{Column, Entity};

    let mut query = Entity::find().filter(Column::Email.eq(email));
    if let Some(id) = exclude_id {
        query = query.filter(Column::Id.ne(id));
    }

    Ok(query.one(db).await?.is_some())
}
