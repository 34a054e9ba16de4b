use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Next level in declaration order, wrapping around. Used by the form's selector.
    pub fn cycle(self, forward: bool) -> Self {
        let all: Vec<Difficulty> = Difficulty::iter().collect();
        let idx = all.iter().position(|d| *d == self).unwrap_or(0);
        let len = all.len();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        all[next]
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub calories_per_serving: u32,
    pub tags: Vec<String>,
    pub user_id: u64,
    pub image: String,
    pub rating: f32,
    pub review_count: u32,
    pub meal_type: Vec<String>,
}

impl Recipe {
    pub fn total_minutes(&self) -> u32 {
        self.prep_time_minutes.saturating_add(self.cook_time_minutes)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn from_fields(id: u64, fields: RecipeFields) -> Self {
        let RecipeFields {
            name,
            ingredients,
            instructions,
            prep_time_minutes,
            cook_time_minutes,
            servings,
            difficulty,
            cuisine,
            calories_per_serving,
            tags,
            user_id,
            image,
            rating,
            review_count,
            meal_type,
        } = fields;
        Self {
            id,
            name,
            ingredients,
            instructions,
            prep_time_minutes,
            cook_time_minutes,
            servings,
            difficulty,
            cuisine,
            calories_per_serving,
            tags,
            user_id,
            image,
            rating,
            review_count,
            meal_type,
        }
    }
}

/// One page of recipes as returned by every list-like endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeResponse {
    pub recipes: Vec<Recipe>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// Everything a recipe carries except its service-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeFields {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub calories_per_serving: u32,
    pub tags: Vec<String>,
    pub user_id: u64,
    pub image: String,
    pub rating: f32,
    pub review_count: u32,
    pub meal_type: Vec<String>,
}

impl Default for RecipeFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            servings: 1,
            difficulty: Difficulty::Easy,
            cuisine: String::new(),
            calories_per_serving: 0,
            tags: Vec::new(),
            user_id: 1,
            image: String::new(),
            rating: 5.0,
            review_count: 0,
            meal_type: Vec::new(),
        }
    }
}

impl From<&Recipe> for RecipeFields {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            prep_time_minutes: recipe.prep_time_minutes,
            cook_time_minutes: recipe.cook_time_minutes,
            servings: recipe.servings,
            difficulty: recipe.difficulty,
            cuisine: recipe.cuisine.clone(),
            calories_per_serving: recipe.calories_per_serving,
            tags: recipe.tags.clone(),
            user_id: recipe.user_id,
            image: recipe.image.clone(),
            rating: recipe.rating,
            review_count: recipe.review_count,
            meal_type: recipe.meal_type.clone(),
        }
    }
}

/// Partial update body; unset fields are left out of the JSON entirely.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    pub name: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub cuisine: Option<String>,
    pub calories_per_serving: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub user_id: Option<u64>,
    pub image: Option<String>,
    pub rating: Option<f32>,
    pub review_count: Option<u32>,
    pub meal_type: Option<Vec<String>>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        *self == RecipePatch::default()
    }

    pub fn apply_to(&self, recipe: &mut Recipe) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        set(&mut recipe.name, &self.name);
        set(&mut recipe.ingredients, &self.ingredients);
        set(&mut recipe.instructions, &self.instructions);
        set(&mut recipe.prep_time_minutes, &self.prep_time_minutes);
        set(&mut recipe.cook_time_minutes, &self.cook_time_minutes);
        set(&mut recipe.servings, &self.servings);
        set(&mut recipe.difficulty, &self.difficulty);
        set(&mut recipe.cuisine, &self.cuisine);
        set(&mut recipe.calories_per_serving, &self.calories_per_serving);
        set(&mut recipe.tags, &self.tags);
        set(&mut recipe.user_id, &self.user_id);
        set(&mut recipe.image, &self.image);
        set(&mut recipe.rating, &self.rating);
        set(&mut recipe.review_count, &self.review_count);
        set(&mut recipe.meal_type, &self.meal_type);
    }
}

impl From<RecipeFields> for RecipePatch {
    fn from(fields: RecipeFields) -> Self {
        Self {
            name: Some(fields.name),
            ingredients: Some(fields.ingredients),
            instructions: Some(fields.instructions),
            prep_time_minutes: Some(fields.prep_time_minutes),
            cook_time_minutes: Some(fields.cook_time_minutes),
            servings: Some(fields.servings),
            difficulty: Some(fields.difficulty),
            cuisine: Some(fields.cuisine),
            calories_per_serving: Some(fields.calories_per_serving),
            tags: Some(fields.tags),
            user_id: Some(fields.user_id),
            image: Some(fields.image),
            rating: Some(fields.rating),
            review_count: Some(fields.review_count),
            meal_type: Some(fields.meal_type),
        }
    }
}

/// A write resolved at the form boundary: either a brand-new recipe or an edit of an existing id.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create(RecipeFields),
    Update { id: u64, fields: RecipeFields },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

impl SaveRequest {
    pub fn kind(&self) -> SaveKind {
        match self {
            SaveRequest::Create(_) => SaveKind::Created,
            SaveRequest::Update { .. } => SaveKind::Updated,
        }
    }

    pub fn fields(&self) -> &RecipeFields {
        match self {
            SaveRequest::Create(fields) => fields,
            SaveRequest::Update { fields, .. } => fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_parses_service_shape() {
        let raw = r#"{
            "id": 7,
            "name": "Chicken Biryani",
            "ingredients": ["Rice", "Chicken"],
            "instructions": ["Soak rice", "Cook"],
            "prepTimeMinutes": 30,
            "cookTimeMinutes": 45,
            "servings": 6,
            "difficulty": "Medium",
            "cuisine": "Pakistani",
            "caloriesPerServing": 550,
            "tags": ["Biryani", "Chicken"],
            "userId": 133,
            "image": "https://cdn.dummyjson.com/recipe-images/7.webp",
            "rating": 4.7,
            "reviewCount": 44,
            "mealType": ["Dinner"]
        }"#;
        let recipe: Recipe = serde_json::from_str(raw).expect("parse");
        assert_eq!(recipe.id, 7);
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert_eq!(recipe.total_minutes(), 75);
        assert_eq!(recipe.meal_type, vec!["Dinner".to_string()]);
    }

    #[test]
    fn fields_serialize_without_id() {
        let json = serde_json::to_value(RecipeFields::default()).expect("json");
        assert!(json.get("id").is_none());
        assert_eq!(json["userId"], 1);
        assert_eq!(json["difficulty"], "Easy");
    }

    #[test]
    fn patch_skips_unset_fields() {
        let patch = RecipePatch {
            name: Some("Renamed".into()),
            ..RecipePatch::default()
        };
        let json = serde_json::to_value(&patch).expect("json");
        let object = json.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert_eq!(object["name"], "Renamed");
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut recipe = Recipe {
            name: "Old".into(),
            cuisine: "Thai".into(),
            ..Recipe::default()
        };
        RecipePatch {
            cuisine: Some("Greek".into()),
            ..RecipePatch::default()
        }
        .apply_to(&mut recipe);
        assert_eq!(recipe.name, "Old");
        assert_eq!(recipe.cuisine, "Greek");
    }

    #[test]
    fn difficulty_cycles_both_ways() {
        assert_eq!(Difficulty::Easy.cycle(true), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.cycle(true), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.cycle(false), Difficulty::Hard);
    }
}
