//! Query parameter parsing for paged collections.
//!
//! Accepts `page`, `size` and repeatable `sort=property[,asc|desc]`.
//! Unknown parameters are ignored; malformed known ones are rejected.

use crate::config::PagingConfig;
use crate::error::ApiError;
use board_core::{Direction, PageRequest, SortField};

pub fn page_request<F: SortField>(
    query: &[(String, String)],
    paging: PagingConfig,
) -> Result<PageRequest<F>, ApiError> {
    let mut page = 0;
    let mut size = None;
    let mut sort = Vec::new();

    for (key, value) in query {
        match key.as_str() {
            "page" => page = parse_number(key, value)?,
            "size" => size = Some(parse_number(key, value)?),
            "sort" => {
                if !value.trim().is_empty() {
                    sort.push(parse_sort::<F>(value)?);
                }
            }
            _ => {}
        }
    }

    let request = PageRequest::of(page, Some(paging.resolve(size)));
    Ok(sort
        .into_iter()
        .fold(request, |request, (field, direction)| request.sorted_by(field, direction)))
}

fn parse_number(key: &str, value: &str) -> Result<u32, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::BadRequest(format!(
            "`{key}` must be a non-negative integer, got `{value}`"
        ))
    })
}

fn parse_sort<F: SortField>(value: &str) -> Result<(F, Direction), ApiError> {
    let (property, direction) = match value.split_once(',') {
        Some((property, direction)) => {
            let direction = Direction::parse(direction).ok_or_else(|| {
                ApiError::BadRequest(format!("unsupported sort direction `{direction}`"))
            })?;
            (property, direction)
        }
        None => (value, Direction::Asc),
    };
    let field = F::parse(property.trim())
        .ok_or_else(|| ApiError::BadRequest(format!("unknown sort property `{property}`")))?;
    Ok((field, direction))
}
