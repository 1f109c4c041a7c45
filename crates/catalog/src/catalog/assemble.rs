//! Response assembly: joined rows plus resolved tags into API records.

use super::types::{SakeDetail, SakeSummary};
use crate::error::{AppError, AppResult};
use crate::models::{Brewery, Sake};

/// Build the search result record.
pub fn assemble_summary(sake: Sake, brewery: &Brewery, tags: Vec<String>) -> SakeSummary {
    SakeSummary {
        id: sake.id,
        name: sake.name,
        brewery: brewery.name.clone(),
        region: sake.region,
        tags,
        image_url: sake.image_url,
    }
}

/// Build the full detail record.
///
/// Decimal columns become floats, or `null` when absent. A present value
/// that does not parse fails the request with [`AppError::DataIntegrity`].
pub fn assemble_detail(sake: Sake, brewery: &Brewery, tags: Vec<String>) -> AppResult<SakeDetail> {
    let nihonshudo = parse_decimal("nihonshudo", sake.nihonshudo.as_deref())?;
    let acid = parse_decimal("acid", sake.acid.as_deref())?;
    let alcohol = parse_decimal("alcohol", sake.alcohol.as_deref())?;

    Ok(SakeDetail {
        id: sake.id,
        name: sake.name,
        brewery: brewery.name.clone(),
        region: sake.region,
        taste_tags: tags.clone(),
        tags,
        rice: sake.rice,
        seimaibuai: sake.seimaibuai,
        nihonshudo,
        acid,
        alcohol,
        description: sake.description,
        image_url: sake.image_url,
    })
}

/// Parse a stored decimal. `None` stays `None`; NaN and infinities are
/// rejected along with anything unparseable.
fn parse_decimal(field: &'static str, raw: Option<&str>) -> AppResult<Option<f64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(AppError::DataIntegrity {
            field,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn brewery() -> Brewery {
        Brewery {
            id: 1,
            name: "Asahi Shuzo".to_string(),
            prefecture: "Yamaguchi".to_string(),
            address: None,
            url: None,
            created_at: NaiveDateTime::default(),
        }
    }

    fn sake() -> Sake {
        Sake {
            id: 1,
            name: "Dassai 23".to_string(),
            brewery_id: 1,
            region: "Yamaguchi".to_string(),
            rice: Some("Yamada Nishiki".to_string()),
            seimaibuai: Some(23),
            nihonshudo: Some("4.0".to_string()),
            acid: Some("1.20".to_string()),
            alcohol: Some("16".to_string()),
            description: None,
            image_url: None,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn summary_flattens_brewery_name() {
        let summary = assemble_summary(sake(), &brewery(), vec!["fruity".to_string()]);

        assert_eq!(summary.id, 1);
        assert_eq!(summary.brewery, "Asahi Shuzo");
        assert_eq!(summary.tags, vec!["fruity"]);
        assert!(summary.image_url.is_none());
    }

    #[test]
    fn detail_duplicates_tag_list() {
        let detail = assemble_detail(sake(), &brewery(), vec!["fruity".to_string()]).unwrap();

        assert_eq!(detail.tags, vec!["fruity"]);
        assert_eq!(detail.taste_tags, detail.tags);
        assert_eq!(detail.nihonshudo, Some(4.0));
        assert_eq!(detail.acid, Some(1.2));
        assert_eq!(detail.alcohol, Some(16.0));
        assert_eq!(detail.seimaibuai, Some(23));
    }

    #[test]
    fn absent_decimals_become_null() {
        let bare = Sake {
            nihonshudo: None,
            acid: None,
            alcohol: None,
            ..sake()
        };
        let detail = assemble_detail(bare, &brewery(), Vec::new()).unwrap();

        assert!(detail.nihonshudo.is_none());
        assert!(detail.acid.is_none());
        assert!(detail.alcohol.is_none());
        assert!(detail.tags.is_empty());
        assert!(detail.taste_tags.is_empty());
    }

    #[test]
    fn corrupt_decimal_is_an_error() {
        let corrupt = Sake {
            acid: Some("one point two".to_string()),
            ..sake()
        };
        let err = assemble_detail(corrupt, &brewery(), Vec::new()).unwrap_err();

        match err {
            AppError::DataIntegrity { field, value } => {
                assert_eq!(field, "acid");
                assert_eq!(value, "one point two");
            }
            other => panic!("expected DataIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn nan_decimal_is_an_error() {
        assert!(parse_decimal("alcohol", Some("NaN")).is_err());
        assert!(parse_decimal("alcohol", Some("")).is_err());
        assert_eq!(parse_decimal("alcohol", Some("-3.5")).unwrap(), Some(-3.5));
    }
}
