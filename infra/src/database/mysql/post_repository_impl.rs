//! MySQL implementation of the PostRepository trait.
//!
//! A post is spread over `posts`, one detail table per subtype (`sales`,
//! `rents`, `exchanges`) and the ordered child rows in `properties` and
//! `images`. Writes touch all of them inside one transaction; reads load the
//! headers with a single joined query and the children in two batched
//! queries.

use std::collections::HashMap;

use async_trait::async_trait;
use sigma_shared::Pagination;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlConnection, MySqlPool, QueryBuilder, Row, Transaction};
use uuid::Uuid;

use sigma_core::domain::entities::{
    Contact, Currency, Features, Frequency, Post, PostDetails, PostType, Property,
};
use sigma_core::domain::value_objects::{
    Address, FeaturesFilter, ImageRef, LocationFilter, PriceFilter, Province, RangeFilter,
    SearchFilter,
};
use sigma_core::errors::{DomainError, PostError};
use sigma_core::repositories::{PostEdit, PostRepository};

use super::{db_error, parse_column, parse_uuid};

const SELECT_POST: &str = r#"
    SELECT p.id, p.user_id, p.post_type, p.description, p.phone, p.whatsapp,
           p.created_at, p.updated_at,
           s.amount, s.currency AS sale_currency,
           r.tax, r.currency AS rent_currency, r.frequency,
           e.needs, e.offers
    FROM posts p
    LEFT JOIN sales s ON s.post_id = p.id
    LEFT JOIN rents r ON r.post_id = p.id
    LEFT JOIN exchanges e ON e.post_id = p.id
"#;

/// MySQL implementation of PostRepository
pub struct MySqlPostRepository {
    pool: MySqlPool,
}

impl MySqlPostRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Decode a joined header row. Properties and images are filled in later.
    fn row_to_post(row: &MySqlRow) -> Result<Post, DomainError> {
        let get = |e: sqlx::Error| DomainError::internal(format!("Failed to read post row: {}", e));

        let id: String = row.try_get("id").map_err(get)?;
        let user_id: String = row.try_get("user_id").map_err(get)?;
        let post_type: String = row.try_get("post_type").map_err(get)?;
        let missing = || DomainError::internal(format!("Post {} has no detail row", id));

        let details = match parse_column::<PostType>("post_type", &post_type)? {
            PostType::Sale => {
                let currency: Option<String> = row.try_get("sale_currency").map_err(get)?;
                PostDetails::Sale {
                    amount: row.try_get::<Option<u32>, _>("amount").map_err(get)?.ok_or_else(missing)?,
                    currency: parse_column::<Currency>("currency", &currency.ok_or_else(missing)?)?,
                }
            }
            PostType::Rent => {
                let currency: Option<String> = row.try_get("rent_currency").map_err(get)?;
                let frequency: Option<String> = row.try_get("frequency").map_err(get)?;
                PostDetails::Rent {
                    tax: row.try_get::<Option<u32>, _>("tax").map_err(get)?.ok_or_else(missing)?,
                    currency: parse_column::<Currency>("currency", &currency.ok_or_else(missing)?)?,
                    frequency: parse_column::<Frequency>(
                        "frequency",
                        &frequency.ok_or_else(missing)?,
                    )?,
                }
            }
            PostType::Exchange => PostDetails::Exchange {
                needs: row.try_get::<Option<u8>, _>("needs").map_err(get)?.ok_or_else(missing)?,
                offers: row.try_get::<Option<u8>, _>("offers").map_err(get)?.ok_or_else(missing)?,
            },
        };

        Ok(Post {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            description: row.try_get("description").map_err(get)?,
            contact: Contact {
                phone: row.try_get("phone").map_err(get)?,
                whatsapp: row.try_get("whatsapp").map_err(get)?,
            },
            details,
            properties: Vec::new(),
            images: Vec::new(),
            created_at: row.try_get("created_at").map_err(get)?,
            updated_at: row.try_get("updated_at").map_err(get)?,
        })
    }

    fn row_to_property(row: &MySqlRow) -> Result<Property, DomainError> {
        let get =
            |e: sqlx::Error| DomainError::internal(format!("Failed to read property row: {}", e));
        let province: String = row.try_get("province").map_err(get)?;
        let province = Province::from_name(&province)
            .ok_or_else(|| DomainError::internal(format!("Unknown province: {}", province)))?;

        Ok(Property {
            address: Address {
                province,
                municipality: row.try_get("municipality").map_err(get)?,
            },
            features: Features {
                bed: row.try_get("bed").map_err(get)?,
                bath: row.try_get("bath").map_err(get)?,
                backyard: row.try_get("backyard").map_err(get)?,
                balcony: row.try_get("balcony").map_err(get)?,
                garage: row.try_get("garage").map_err(get)?,
                pool: row.try_get("pool").map_err(get)?,
            },
        })
    }

    /// Fetch the headers selected by `builder` and attach their children
    async fn fetch_posts(&self, builder: QueryBuilder<'_, MySql>) -> Result<Vec<Post>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        Self::load_posts(&mut conn, builder).await
    }

    /// Same as [`Self::fetch_posts`] on a given connection, so that a
    /// transaction can read what it is about to rewrite
    async fn load_posts(
        conn: &mut MySqlConnection,
        mut builder: QueryBuilder<'_, MySql>,
    ) -> Result<Vec<Post>, DomainError> {
        let rows = builder
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(db_error("Failed to load posts"))?;

        let mut posts = rows
            .iter()
            .map(Self::row_to_post)
            .collect::<Result<Vec<_>, _>>()?;
        Self::attach_children(conn, &mut posts).await?;
        Ok(posts)
    }

    async fn attach_children(
        conn: &mut MySqlConnection,
        posts: &mut [Post],
    ) -> Result<(), DomainError> {
        if posts.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = posts.iter().map(|p| p.id.to_string()).collect();

        let mut properties: HashMap<String, Vec<Property>> = HashMap::new();
        let rows = children_query(
            "SELECT post_id, province, municipality, bed, bath, backyard, balcony, garage, pool \
             FROM properties",
            &ids,
        )
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("Failed to load properties"))?;
        for row in &rows {
            let post_id: String = row
                .try_get("post_id")
                .map_err(db_error("Failed to read property row"))?;
            properties
                .entry(post_id)
                .or_default()
                .push(Self::row_to_property(row)?);
        }

        let mut images: HashMap<String, Vec<ImageRef>> = HashMap::new();
        let rows = children_query("SELECT post_id, url, size FROM images", &ids)
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(db_error("Failed to load images"))?;
        for row in &rows {
            let read = db_error("Failed to read image row");
            let post_id: String = row.try_get("post_id").map_err(&read)?;
            let url: String = row.try_get("url").map_err(&read)?;
            let size: u64 = row.try_get("size").map_err(&read)?;
            images.entry(post_id).or_default().push(ImageRef::new(url, size));
        }

        for post in posts.iter_mut() {
            let key = post.id.to_string();
            post.properties = properties.remove(&key).unwrap_or_default();
            post.images = images.remove(&key).unwrap_or_default();
        }
        Ok(())
    }

    async fn insert_details(
        tx: &mut Transaction<'_, MySql>,
        post: &Post,
    ) -> Result<(), DomainError> {
        let id = post.id.to_string();
        let query = match &post.details {
            PostDetails::Sale { amount, currency } => {
                sqlx::query("INSERT INTO sales (post_id, amount, currency) VALUES (?, ?, ?)")
                    .bind(id)
                    .bind(*amount)
                    .bind(currency.as_str())
            }
            PostDetails::Rent {
                tax,
                currency,
                frequency,
            } => sqlx::query(
                "INSERT INTO rents (post_id, tax, currency, frequency) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(*tax)
            .bind(currency.as_str())
            .bind(frequency.as_str()),
            PostDetails::Exchange { needs, offers } => {
                sqlx::query("INSERT INTO exchanges (post_id, needs, offers) VALUES (?, ?, ?)")
                    .bind(id)
                    .bind(*needs)
                    .bind(*offers)
            }
        };
        query
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to insert post details"))?;
        Ok(())
    }

    /// Insert the ordered property and image rows of `post`
    async fn insert_children(
        tx: &mut Transaction<'_, MySql>,
        post: &Post,
    ) -> Result<(), DomainError> {
        let id = post.id.to_string();

        let mut properties = QueryBuilder::<MySql>::new(
            "INSERT INTO properties \
             (post_id, position, province, municipality, bed, bath, backyard, balcony, garage, pool) ",
        );
        properties.push_values(post.properties.iter().enumerate(), |mut b, (position, p)| {
            b.push_bind(id.clone())
                .push_bind(position as u8)
                .push_bind(p.address.province.name())
                .push_bind(p.address.municipality.clone())
                .push_bind(p.features.bed)
                .push_bind(p.features.bath)
                .push_bind(p.features.backyard)
                .push_bind(p.features.balcony)
                .push_bind(p.features.garage)
                .push_bind(p.features.pool);
        });
        properties
            .build()
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to insert properties"))?;

        let mut images =
            QueryBuilder::<MySql>::new("INSERT INTO images (post_id, position, url, size) ");
        images.push_values(post.images.iter().enumerate(), |mut b, (position, image)| {
            b.push_bind(id.clone())
                .push_bind(position as u8)
                .push_bind(image.url.clone())
                .push_bind(image.size);
        });
        images
            .build()
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to insert images"))?;

        Ok(())
    }
}

/// `SELECT ... WHERE post_id IN (...)` ordered by position
fn children_query<'a>(select: &str, ids: &'a [String]) -> QueryBuilder<'a, MySql> {
    let mut builder = QueryBuilder::new(select);
    builder.push(" WHERE post_id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(") ORDER BY post_id, position");
    builder
}

fn push_range(builder: &mut QueryBuilder<'_, MySql>, column: &str, range: &RangeFilter) {
    if let Some(gte) = range.gte {
        builder.push(format!(" AND {} >= ", column)).push_bind(gte);
    }
    if let Some(lte) = range.lte {
        builder.push(format!(" AND {} <= ", column)).push_bind(lte);
    }
}

fn push_flag(builder: &mut QueryBuilder<'_, MySql>, column: &str, value: Option<bool>) {
    if let Some(value) = value {
        builder.push(format!(" AND {} = ", column)).push_bind(value);
    }
}

fn push_property_conditions(
    builder: &mut QueryBuilder<'_, MySql>,
    location: Option<&LocationFilter>,
    features: Option<&FeaturesFilter>,
) {
    builder.push(" AND EXISTS (SELECT 1 FROM properties pr WHERE pr.post_id = p.id");
    if let Some(location) = location {
        builder
            .push(" AND pr.province = ")
            .push_bind(location.province.name());
        if let Some(municipality) = &location.municipality {
            builder
                .push(" AND pr.municipality = ")
                .push_bind(municipality.clone());
        }
    }
    if let Some(features) = features {
        if let Some(bed) = &features.bed {
            push_range(builder, "pr.bed", bed);
        }
        if let Some(bath) = &features.bath {
            push_range(builder, "pr.bath", bath);
        }
        push_flag(builder, "pr.backyard", features.backyard);
        push_flag(builder, "pr.balcony", features.balcony);
        push_flag(builder, "pr.garage", features.garage);
        push_flag(builder, "pr.pool", features.pool);
    }
    builder.push(")");
}

/// The full search statement: type, price, one property matching both the
/// location and the features, newest first, one page
pub(crate) fn search_query(
    filter: &SearchFilter,
    pagination: Pagination,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(SELECT_POST);
    builder
        .push(" WHERE p.post_type = ")
        .push_bind(filter.post_type.as_str());

    match &filter.price {
        Some(PriceFilter::Sale(amount)) => {
            builder
                .push(" AND s.currency = ")
                .push_bind(amount.currency.as_str());
            push_range(&mut builder, "s.amount", &amount.range);
        }
        Some(PriceFilter::Rent { amount, frequency }) => {
            builder
                .push(" AND r.currency = ")
                .push_bind(amount.currency.as_str())
                .push(" AND r.frequency = ")
                .push_bind(frequency.as_str());
            push_range(&mut builder, "r.tax", &amount.range);
        }
        None => {}
    }

    if filter.location.is_some() || filter.features.is_some() {
        push_property_conditions(
            &mut builder,
            filter.location.as_ref(),
            filter.features.as_ref(),
        );
    }

    builder
        .push(" ORDER BY p.created_at DESC LIMIT ")
        .push_bind(pagination.limit_i64())
        .push(" OFFSET ")
        .push_bind(pagination.offset_i64());
    builder
}

#[async_trait]
impl PostRepository for MySqlPostRepository {
    async fn create(&self, post: Post, max_posts: usize) -> Result<Post, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Serializes concurrent creates of the same author
        sqlx::query("SELECT id FROM users WHERE id = ? FOR UPDATE")
            .bind(post.user_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock author"))?;

        let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = ?")
            .bind(post.user_id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count posts"))?;
        if owned >= max_posts as i64 {
            return Err(PostError::MaxPostLength { limit: max_posts }.into());
        }

        sqlx::query(
            r#"
            INSERT INTO posts (
                id, user_id, post_type, description, phone, whatsapp, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.id.to_string())
        .bind(post.user_id.to_string())
        .bind(post.post_type().as_str())
        .bind(post.description.as_deref())
        .bind(&post.contact.phone)
        .bind(post.contact.whatsapp)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert post"))?;

        Self::insert_details(&mut tx, &post).await?;
        Self::insert_children(&mut tx, &post).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit post"))?;
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let mut builder = QueryBuilder::new(SELECT_POST);
        builder.push(" WHERE p.id = ").push_bind(id.to_string());
        Ok(self.fetch_posts(builder).await?.pop())
    }

    async fn find_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        let mut builder = QueryBuilder::new(SELECT_POST);
        builder
            .push(" WHERE p.user_id = ")
            .push_bind(user_id.to_string())
            .push(" ORDER BY p.created_at DESC");
        self.fetch_posts(builder).await
    }

    async fn update(&self, id: Uuid, edit: PostEdit) -> Result<Post, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        let id = id.to_string();

        // Held until commit, concurrent edits of the post wait here
        let mut locked = QueryBuilder::new(SELECT_POST);
        locked
            .push(" WHERE p.id = ")
            .push_bind(id.clone())
            .push(" FOR UPDATE");
        let mut post = Self::load_posts(&mut tx, locked)
            .await?
            .pop()
            .ok_or(PostError::NotFound)?;
        let stored_type = post.post_type();

        edit(&mut post)?;

        let result = sqlx::query(
            "UPDATE posts SET description = ?, phone = ?, whatsapp = ?, updated_at = ? WHERE id = ?",
        )
        .bind(post.description.as_deref())
        .bind(&post.contact.phone)
        .bind(post.contact.whatsapp)
        .bind(post.updated_at)
        .bind(&id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update post"))?;
        if result.rows_affected() == 0 {
            return Err(PostError::NotFound.into());
        }

        let detail_table = match stored_type {
            PostType::Sale => "sales",
            PostType::Rent => "rents",
            PostType::Exchange => "exchanges",
        };
        for table in [detail_table, "properties", "images"] {
            sqlx::query(&format!("DELETE FROM {} WHERE post_id = ?", table))
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to clear post rows"))?;
        }

        Self::insert_details(&mut tx, &post).await?;
        Self::insert_children(&mut tx, &post).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit post update"))?;
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete post"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        filter: &SearchFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        self.fetch_posts(search_query(filter, pagination)).await
    }
}
