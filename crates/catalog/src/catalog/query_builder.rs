//! Catalog query builder using SeaQuery.
//!
//! One [`SakeQueryBuilder`] renders both the paginated page query and the
//! matching COUNT query from the same [`SakeFilter`], so the reported total
//! always reflects the same predicate as the rows. The remaining builders
//! cover detail lookup, bulk tag resolution and the facet lists.

use sea_query::extension::postgres::PgExpr;
use sea_query::{
    Alias, Asterisk, Cond, Expr, ExprTrait, Func, Iden, Order, PostgresQueryBuilder, Query,
    SelectStatement,
};

use super::types::{Page, SakeFilter};

#[derive(Iden)]
enum Sake {
    Table,
    Id,
    Name,
    BreweryId,
    Region,
    Rice,
    Seimaibuai,
    Nihonshudo,
    Acid,
    Alcohol,
    Description,
    ImageUrl,
    CreatedAt,
}

#[derive(Iden)]
enum Brewery {
    Table,
    Id,
    Name,
    Prefecture,
    Address,
    Url,
    CreatedAt,
}

#[derive(Iden)]
enum TasteTag {
    Table,
    Id,
    Label,
}

#[derive(Iden)]
enum SakeTasteTagMap {
    Table,
    SakeId,
    TagId,
}

/// Query builder for sake searches.
pub struct SakeQueryBuilder {
    filter: SakeFilter,
}

impl SakeQueryBuilder {
    /// Create a builder for a filter.
    pub fn new(filter: SakeFilter) -> Self {
        Self { filter }
    }

    /// Build the page query: joined rows ordered by sake id.
    pub fn build(&self, page: Page) -> String {
        let mut query = Query::select();

        add_record_columns(&mut query);
        add_brewery_join(&mut query);
        self.add_filters(&mut query);

        // Stable tie-break so offset pagination never repeats or skips rows.
        query.order_by((Sake::Table, Sake::Id), Order::Asc);

        query.limit(page.limit());
        query.offset(page.offset());

        query.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over the same filter, without pagination.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        add_brewery_join(&mut query);
        self.add_filters(&mut query);

        query.to_string(PostgresQueryBuilder)
    }

    /// Add WHERE conditions: text match OR-ed across three columns, AND-ed
    /// with the exact region.
    fn add_filters(&self, query: &mut SelectStatement) {
        if self.filter.is_unfiltered() {
            return;
        }

        let mut cond = Cond::all();

        if let Some(ref text) = self.filter.text {
            let pattern = format!("%{}%", escape_like_wildcards(text));
            cond = cond.add(
                Cond::any()
                    .add(Expr::col((Sake::Table, Sake::Name)).ilike(pattern.clone()))
                    .add(Expr::col((Brewery::Table, Brewery::Name)).ilike(pattern.clone()))
                    .add(Expr::col((Sake::Table, Sake::Description)).ilike(pattern)),
            );
        }

        if let Some(ref region) = self.filter.region {
            cond = cond.add(Expr::col((Sake::Table, Sake::Region)).eq(region.as_str()));
        }

        query.cond_where(cond);
    }
}

/// Build the single-sake lookup query.
pub fn build_detail(id: i32) -> String {
    let mut query = Query::select();

    add_record_columns(&mut query);
    add_brewery_join(&mut query);
    query.and_where(Expr::col((Sake::Table, Sake::Id)).eq(id));

    query.to_string(PostgresQueryBuilder)
}

/// Build the bulk tag lookup for a set of sake ids.
///
/// Returns `None` for an empty id set; there is nothing to look up.
pub fn build_tags(sake_ids: &[i32]) -> Option<String> {
    if sake_ids.is_empty() {
        return None;
    }

    let mut query = Query::select();

    query
        .column((SakeTasteTagMap::Table, SakeTasteTagMap::SakeId))
        .column((TasteTag::Table, TasteTag::Label))
        .from(SakeTasteTagMap::Table)
        .inner_join(
            TasteTag::Table,
            Expr::col((TasteTag::Table, TasteTag::Id))
                .equals((SakeTasteTagMap::Table, SakeTasteTagMap::TagId)),
        )
        .and_where(
            Expr::col((SakeTasteTagMap::Table, SakeTasteTagMap::SakeId))
                .is_in(sake_ids.iter().copied()),
        )
        .order_by((SakeTasteTagMap::Table, SakeTasteTagMap::SakeId), Order::Asc)
        .order_by((SakeTasteTagMap::Table, SakeTasteTagMap::TagId), Order::Asc);

    Some(query.to_string(PostgresQueryBuilder))
}

/// Build the distinct region list query.
pub fn build_regions() -> String {
    let mut query = Query::select();

    query
        .distinct()
        .column(Sake::Region)
        .from(Sake::Table)
        .order_by(Sake::Region, Order::Asc);

    query.to_string(PostgresQueryBuilder)
}

/// Build the full tag vocabulary query.
pub fn build_tag_labels() -> String {
    let mut query = Query::select();

    query
        .column(TasteTag::Label)
        .from(TasteTag::Table)
        .order_by(TasteTag::Label, Order::Asc);

    query.to_string(PostgresQueryBuilder)
}

/// SELECT the sake columns plus the brewery columns under `brewery_*` aliases.
///
/// NUMERIC columns are cast to text so decoding never loses the raw value.
fn add_record_columns(query: &mut SelectStatement) {
    query.columns([
        (Sake::Table, Sake::Id),
        (Sake::Table, Sake::Name),
        (Sake::Table, Sake::BreweryId),
        (Sake::Table, Sake::Region),
        (Sake::Table, Sake::Rice),
        (Sake::Table, Sake::Seimaibuai),
    ]);

    for (column, alias) in [
        (Sake::Nihonshudo, "nihonshudo"),
        (Sake::Acid, "acid"),
        (Sake::Alcohol, "alcohol"),
    ] {
        query.expr_as(
            Func::cast_as(Expr::col((Sake::Table, column)), Alias::new("text")),
            Alias::new(alias),
        );
    }

    query.columns([
        (Sake::Table, Sake::Description),
        (Sake::Table, Sake::ImageUrl),
        (Sake::Table, Sake::CreatedAt),
    ]);

    for (column, alias) in [
        (Brewery::Name, "brewery_name"),
        (Brewery::Prefecture, "brewery_prefecture"),
        (Brewery::Address, "brewery_address"),
        (Brewery::Url, "brewery_url"),
        (Brewery::CreatedAt, "brewery_created_at"),
    ] {
        query.expr_as(Expr::col((Brewery::Table, column)), Alias::new(alias));
    }
}

/// FROM sake INNER JOIN brewery.
fn add_brewery_join(query: &mut SelectStatement) {
    query.from(Sake::Table).inner_join(
        Brewery::Table,
        Expr::col((Brewery::Table, Brewery::Id)).equals((Sake::Table, Sake::BreweryId)),
    );
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
