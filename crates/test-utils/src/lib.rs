//! Washu test utilities.
//!
//! Seed fixture builders and JSON assertion helpers shared by the catalog
//! integration tests. Fixtures produce seed documents as JSON so they can
//! feed both the in-memory store and the PostgreSQL seed loader.

use serde_json::{Value as JsonValue, json};

/// Create a test brewery.
pub fn test_brewery(id: i32, name: &str, prefecture: &str) -> TestBrewery {
    TestBrewery {
        id,
        name: name.to_string(),
        prefecture: prefecture.to_string(),
        address: None,
        url: None,
    }
}

/// A brewery fixture.
#[derive(Debug, Clone)]
pub struct TestBrewery {
    pub id: i32,
    pub name: String,
    pub prefecture: String,
    pub address: Option<String>,
    pub url: Option<String>,
}

impl TestBrewery {
    /// Set the street address.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Set the homepage.
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "name": self.name,
            "prefecture": self.prefecture,
            "address": self.address,
            "url": self.url,
        })
    }
}

/// Create a test sake with only the required columns set.
pub fn test_sake(id: i32, name: &str, brewery_id: i32, region: &str) -> TestSake {
    TestSake {
        id,
        name: name.to_string(),
        brewery_id,
        region: region.to_string(),
        rice: None,
        seimaibuai: None,
        nihonshudo: None,
        acid: None,
        alcohol: None,
        description: None,
        image_url: None,
    }
}

/// A sake fixture.
#[derive(Debug, Clone)]
pub struct TestSake {
    pub id: i32,
    pub name: String,
    pub brewery_id: i32,
    pub region: String,
    pub rice: Option<String>,
    pub seimaibuai: Option<i32>,
    pub nihonshudo: Option<f64>,
    pub acid: Option<f64>,
    pub alcohol: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl TestSake {
    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the image URL.
    pub fn with_image(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }

    /// Set rice variety and polishing ratio.
    pub fn with_rice(mut self, rice: &str, seimaibuai: i32) -> Self {
        self.rice = Some(rice.to_string());
        self.seimaibuai = Some(seimaibuai);
        self
    }

    /// Set nihonshudo, acidity and alcohol percentage.
    pub fn with_numbers(mut self, nihonshudo: f64, acid: f64, alcohol: f64) -> Self {
        self.nihonshudo = Some(nihonshudo);
        self.acid = Some(acid);
        self.alcohol = Some(alcohol);
        self
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "name": self.name,
            "brewery_id": self.brewery_id,
            "region": self.region,
            "rice": self.rice,
            "seimaibuai": self.seimaibuai,
            "nihonshudo": self.nihonshudo,
            "acid": self.acid,
            "alcohol": self.alcohol,
            "description": self.description,
            "image_url": self.image_url,
        })
    }
}

/// Builder for a whole seed document.
#[derive(Debug, Clone, Default)]
pub struct SeedBuilder {
    breweries: Vec<TestBrewery>,
    taste_tags: Vec<(i32, String)>,
    sake: Vec<TestSake>,
    links: Vec<(i32, i32)>,
}

impl SeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brewery(mut self, brewery: TestBrewery) -> Self {
        self.breweries.push(brewery);
        self
    }

    pub fn tag(mut self, id: i32, label: &str) -> Self {
        self.taste_tags.push((id, label.to_string()));
        self
    }

    pub fn sake(mut self, sake: TestSake) -> Self {
        self.sake.push(sake);
        self
    }

    /// Attach tag `tag_id` to sake `sake_id`.
    pub fn link(mut self, sake_id: i32, tag_id: i32) -> Self {
        self.links.push((sake_id, tag_id));
        self
    }

    /// Render the seed document.
    pub fn build(&self) -> JsonValue {
        json!({
            "breweries": self.breweries.iter().map(TestBrewery::to_json).collect::<Vec<_>>(),
            "taste_tags": self
                .taste_tags
                .iter()
                .map(|(id, label)| json!({"id": id, "label": label}))
                .collect::<Vec<_>>(),
            "sake": self.sake.iter().map(TestSake::to_json).collect::<Vec<_>>(),
            "sake_taste_map": self
                .links
                .iter()
                .map(|(sake_id, tag_id)| json!({"sake_id": sake_id, "tag_id": tag_id}))
                .collect::<Vec<_>>(),
        })
    }

    /// Render the seed document as JSON text.
    pub fn build_string(&self) -> String {
        self.build().to_string()
    }
}

/// A small catalog covering the common search cases.
///
/// Breweries: Asahi Shuzo (Yamaguchi), Kikusui (Niigata), Gekkeikan (Kyoto).
/// Sake 1 is Dassai 23 with tags fruity and floral; sake 4 has no tags.
pub fn sample_catalog() -> SeedBuilder {
    SeedBuilder::new()
        .brewery(
            test_brewery(1, "Asahi Shuzo", "Yamaguchi").with_url("https://www.asahishuzo.ne.jp"),
        )
        .brewery(test_brewery(2, "Kikusui Shuzo", "Niigata"))
        .brewery(test_brewery(3, "Gekkeikan", "Kyoto").with_address("Fushimi, Kyoto"))
        .tag(1, "fruity")
        .tag(2, "floral")
        .tag(3, "dry")
        .tag(4, "rich")
        .tag(5, "smoky")
        .sake(
            test_sake(1, "Dassai 23", 1, "Yamaguchi")
                .with_rice("Yamada Nishiki", 23)
                .with_numbers(4.0, 1.2, 16.0)
                .with_description("Junmai daiginjo polished to 23 percent")
                .with_image("https://img.example/dassai23.jpg"),
        )
        .sake(
            test_sake(2, "Kikusui Funaguchi", 2, "Niigata")
                .with_description("Unpasteurised and rich"),
        )
        .sake(test_sake(3, "Kikusui Junmai Ginjo", 2, "Niigata"))
        .sake(test_sake(4, "Gekkeikan Horin", 3, "Kyoto").with_numbers(1.0, 1.3, 15.5))
        .sake(test_sake(5, "Tama no Hikari", 3, "Kyoto").with_description("Dry and crisp"))
        .link(1, 1)
        .link(1, 2)
        .link(2, 4)
        .link(3, 3)
        .link(5, 3)
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert the error body shape `{code, message}` and the code.
    pub fn error_code(body: &Value, code: &str) {
        has_key(body, "message");
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some(code),
            "Expected error code '{code}', got: {body}"
        );
    }

    /// Assert that `items` in a search page have these ids, in order.
    pub fn item_ids(page: &Value, expected: &[i64]) {
        let ids: Vec<i64> = page
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|i| i["id"].as_i64()).collect())
            .unwrap_or_default();
        assert_eq!(ids, expected, "Unexpected item ids in page: {page}");
    }

    /// Assert that a JSON value is an array of these strings.
    pub fn string_list(value: &Value, expected: &[&str]) {
        let actual: Vec<&str> = value
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        assert_eq!(actual, expected, "Unexpected string list: {value}");
    }
}
