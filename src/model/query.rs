use std::{future::Future, str::FromStr, time::Duration};

use sea_orm::{
    sea_query::Expr, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, Iterable,
    PaginatorTrait, PrimaryKeyToColumn, QueryOrder, QueryResult, QuerySelect, Select,
};
use tracing::{debug, error, warn, Span};

use super::{calculate_metadata, Filters, Metadata, StoreError};

pub(crate) const TOTAL_RECORDS: &str = "total_records";

/// A row together with the windowed count of every row matching the filter.
pub(crate) struct Counted<M> {
    pub(crate) total_records: i64,
    pub(crate) model: M,
}

impl<M: FromQueryResult> FromQueryResult for Counted<M> {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            total_records: res.try_get(pre, TOTAL_RECORDS)?,
            model: M::from_query_result(res, pre)?,
        })
    }
}

/// Runs one store round trip, giving up after `limit`.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// Adds the windowed count, ordering and paging to `select`.
///
/// Fails with `ValidationFailed` unless the sort key is on the safelist;
/// only then is it resolved to a column of `E`.
pub(crate) fn page_query<E: EntityTrait>(
    select: Select<E>,
    filters: &Filters,
) -> Result<Select<E>, StoreError> {
    filters.validate()?;

    let column = E::Column::from_str(filters.sort_column()).map_err(|_| {
        StoreError::Internal(DbErr::Custom(format!(
            "sort key {} does not name a column",
            filters.sort_column()
        )))
    })?;

    let mut select = select
        .column_as(Expr::cust("COUNT(*) OVER()"), TOTAL_RECORDS)
        .order_by(column, filters.sort_direction().into());
    // Sort values repeat, the primary key keeps pages stable.
    for key in E::PrimaryKey::iter() {
        select = select.order_by_asc(key.into_column());
    }

    Ok(select.limit(filters.limit()).offset(filters.offset()))
}

pub(crate) async fn fetch_page<C, E>(
    db: &C,
    select: Select<E>,
    filters: &Filters,
    timeout: Duration,
) -> Result<(Vec<E::Model>, Metadata), StoreError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let query = page_query(select.clone(), filters)?;
    let rows = bounded(
        timeout,
        query.into_model::<Counted<E::Model>>().all(db),
    )
    .await?;

    let total_records = match rows.first() {
        Some(row) => row.total_records,
        // Past the last page there is no row to carry the window count.
        None if filters.offset() > 0 => bounded(timeout, select.count(db)).await? as i64,
        None => 0,
    };

    let metadata = calculate_metadata(total_records, filters.page(), filters.page_size());
    Ok((rows.into_iter().map(|row| row.model).collect(), metadata))
}

pub(crate) fn log_failure(span: &Span, operation: &str, err: &StoreError) {
    match err {
        StoreError::Internal(e) => error!(parent: span, operation, error = %e, "store failure"),
        StoreError::Timeout(limit) => {
            warn!(parent: span, operation, timeout = ?limit, "store operation timed out")
        }
        _ => debug!(parent: span, operation, error = %err, "operation rejected"),
    }
}
