use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use crate::api::{Difficulty, Recipe, RecipeFields, SaveRequest};

const MAX_TEXT_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("servings must be at least 1")]
    InvalidServings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Ingredients,
    Instructions,
    Tags,
    MealType,
}

impl ListField {
    pub const ALL: [ListField; 4] = [
        ListField::Ingredients,
        ListField::Instructions,
        ListField::Tags,
        ListField::MealType,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ListField::Ingredients => "Ingredients",
            ListField::Instructions => "Instructions",
            ListField::Tags => "Tags",
            ListField::MealType => "Meal Types",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            ListField::Ingredients => "e.g., 2 cups flour",
            ListField::Instructions => "Describe this step...",
            ListField::Tags => "e.g., vegetarian",
            ListField::MealType => "e.g., breakfast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberField {
    PrepTime,
    CookTime,
    Servings,
    Calories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Cuisine,
    Difficulty,
    Image,
    Number(NumberField),
    Entry(ListField, usize),
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Recipe Name *",
            FormField::Cuisine => "Cuisine *",
            FormField::Difficulty => "Difficulty",
            FormField::Image => "Image URL",
            FormField::Number(NumberField::PrepTime) => "Prep Time (min)",
            FormField::Number(NumberField::CookTime) => "Cook Time (min)",
            FormField::Number(NumberField::Servings) => "Servings",
            FormField::Number(NumberField::Calories) => "Calories per serving",
            FormField::Entry(list, _) => list.label(),
        }
    }
}

/// Working copy of a recipe while the create/edit form is open.
///
/// Always built from scratch on open, so nothing leaks between an edit and a later create.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    original_id: Option<u64>,
    pub name: String,
    pub cuisine: String,
    pub difficulty: Difficulty,
    pub image: String,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub servings: u32,
    pub calories_per_serving: u32,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
    pub meal_type: Vec<String>,
    rating: f32,
    review_count: u32,
    user_id: u64,
    focus: usize,
    pub error: Option<String>,
    pub saving: bool,
}

impl FormState {
    pub fn create() -> Self {
        let defaults = RecipeFields::default();
        Self::from_fields(None, defaults)
    }

    pub fn edit(recipe: &Recipe) -> Self {
        Self::from_fields(Some(recipe.id), RecipeFields::from(recipe))
    }

    fn from_fields(original_id: Option<u64>, fields: RecipeFields) -> Self {
        Self {
            original_id,
            name: fields.name,
            cuisine: fields.cuisine,
            difficulty: fields.difficulty,
            image: fields.image,
            prep_time_minutes: fields.prep_time_minutes,
            cook_time_minutes: fields.cook_time_minutes,
            servings: fields.servings,
            calories_per_serving: fields.calories_per_serving,
            ingredients: at_least_one(fields.ingredients),
            instructions: at_least_one(fields.instructions),
            tags: at_least_one(fields.tags),
            meal_type: at_least_one(fields.meal_type),
            rating: fields.rating,
            review_count: fields.review_count,
            user_id: fields.user_id,
            focus: 0,
            error: None,
            saving: false,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.original_id.is_some()
    }

    pub fn original_id(&self) -> Option<u64> {
        self.original_id
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() {
            "Edit Recipe"
        } else {
            "Create New Recipe"
        }
    }

    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Ingredients => &self.ingredients,
            ListField::Instructions => &self.instructions,
            ListField::Tags => &self.tags,
            ListField::MealType => &self.meal_type,
        }
    }

    fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Ingredients => &mut self.ingredients,
            ListField::Instructions => &mut self.instructions,
            ListField::Tags => &mut self.tags,
            ListField::MealType => &mut self.meal_type,
        }
    }

    pub fn add_entry(&mut self, field: ListField) {
        self.list_mut(field).push(String::new());
    }

    /// Refuses to drop the last remaining entry.
    pub fn remove_entry(&mut self, field: ListField, index: usize) -> bool {
        let list = self.list_mut(field);
        if list.len() <= 1 || index >= list.len() {
            return false;
        }
        list.remove(index);
        self.clamp_focus();
        true
    }

    pub fn set_entry(&mut self, field: ListField, index: usize, value: &str) -> bool {
        match self.list_mut(field).get_mut(index) {
            Some(slot) => {
                slot.clear();
                slot.push_str(value);
                true
            }
            None => false,
        }
    }

    pub fn number(&self, field: NumberField) -> u32 {
        match field {
            NumberField::PrepTime => self.prep_time_minutes,
            NumberField::CookTime => self.cook_time_minutes,
            NumberField::Servings => self.servings,
            NumberField::Calories => self.calories_per_serving,
        }
    }

    fn number_mut(&mut self, field: NumberField) -> &mut u32 {
        match field {
            NumberField::PrepTime => &mut self.prep_time_minutes,
            NumberField::CookTime => &mut self.cook_time_minutes,
            NumberField::Servings => &mut self.servings,
            NumberField::Calories => &mut self.calories_per_serving,
        }
    }

    /// Every focusable field in display order.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Name,
            FormField::Cuisine,
            FormField::Difficulty,
            FormField::Image,
            FormField::Number(NumberField::PrepTime),
            FormField::Number(NumberField::CookTime),
            FormField::Number(NumberField::Servings),
            FormField::Number(NumberField::Calories),
        ];
        for list in ListField::ALL {
            fields.extend((0..self.list(list).len()).map(|idx| FormField::Entry(list, idx)));
        }
        fields
    }

    pub fn focused(&self) -> FormField {
        let fields = self.fields();
        fields
            .get(self.focus)
            .copied()
            .unwrap_or(FormField::Name)
    }

    pub fn focus_next(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + 1) % len;
    }

    pub fn focus_previous(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    fn focus_field(&mut self, target: FormField) {
        if let Some(idx) = self.fields().iter().position(|field| *field == target) {
            self.focus = idx;
        }
    }

    fn clamp_focus(&mut self) {
        let len = self.fields().len();
        if self.focus >= len {
            self.focus = len - 1;
        }
    }

    /// Appends an entry to the list under the cursor and moves focus onto it.
    pub fn add_entry_at_focus(&mut self) -> bool {
        let FormField::Entry(list, _) = self.focused() else {
            return false;
        };
        self.add_entry(list);
        let last = self.list(list).len() - 1;
        self.focus_field(FormField::Entry(list, last));
        true
    }

    pub fn remove_entry_at_focus(&mut self) -> bool {
        let FormField::Entry(list, idx) = self.focused() else {
            return false;
        };
        self.remove_entry(list, idx)
    }

    pub fn insert_char(&mut self, ch: char) {
        self.error = None;
        match self.focused() {
            FormField::Name => push_limited(&mut self.name, ch),
            FormField::Cuisine => push_limited(&mut self.cuisine, ch),
            FormField::Image => push_limited(&mut self.image, ch),
            FormField::Difficulty => match ch {
                'e' | 'E' => self.difficulty = Difficulty::Easy,
                'm' | 'M' => self.difficulty = Difficulty::Medium,
                'h' | 'H' => self.difficulty = Difficulty::Hard,
                ' ' => self.difficulty = self.difficulty.cycle(true),
                _ => {}
            },
            FormField::Number(field) => {
                if let Some(digit) = ch.to_digit(10) {
                    let slot = self.number_mut(field);
                    *slot = slot.saturating_mul(10).saturating_add(digit);
                }
            }
            FormField::Entry(list, idx) => {
                if let Some(entry) = self.list_mut(list).get_mut(idx) {
                    push_limited(entry, ch);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.focused() {
            FormField::Name => pop_grapheme(&mut self.name),
            FormField::Cuisine => pop_grapheme(&mut self.cuisine),
            FormField::Image => pop_grapheme(&mut self.image),
            FormField::Difficulty => {}
            FormField::Number(field) => {
                let slot = self.number_mut(field);
                *slot /= 10;
            }
            FormField::Entry(list, idx) => {
                if let Some(entry) = self.list_mut(list).get_mut(idx) {
                    pop_grapheme(entry);
                }
            }
        }
    }

    pub fn cycle_difficulty(&mut self, forward: bool) {
        if self.focused() == FormField::Difficulty {
            self.difficulty = self.difficulty.cycle(forward);
        }
    }

    /// Validates and cleans the working copy into a create or update request.
    pub fn submit(&self) -> Result<SaveRequest, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingField("Recipe name"));
        }
        if self.cuisine.trim().is_empty() {
            return Err(FormError::MissingField("Cuisine"));
        }
        if self.servings == 0 {
            return Err(FormError::InvalidServings);
        }
        let fields = RecipeFields {
            name: self.name.clone(),
            ingredients: clean_entries(&self.ingredients),
            instructions: clean_entries(&self.instructions),
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            difficulty: self.difficulty,
            cuisine: self.cuisine.clone(),
            calories_per_serving: self.calories_per_serving,
            tags: clean_entries(&self.tags),
            user_id: self.user_id,
            image: self.image.clone(),
            rating: self.rating,
            review_count: self.review_count,
            meal_type: clean_entries(&self.meal_type),
        };
        Ok(match self.original_id {
            Some(id) => SaveRequest::Update { id, fields },
            None => SaveRequest::Create(fields),
        })
    }
}

/// Drops blank and whitespace-only entries, keeping the rest in order and untouched.
pub fn clean_entries(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| !entry.trim().is_empty())
        .cloned()
        .collect()
}

/// Validation and cleaning shared with the command line create path.
pub fn prepare_fields(fields: RecipeFields) -> Result<RecipeFields, FormError> {
    match FormState::from_fields(None, fields).submit()? {
        SaveRequest::Create(fields) | SaveRequest::Update { fields, .. } => Ok(fields),
    }
}

fn at_least_one(mut entries: Vec<String>) -> Vec<String> {
    if entries.is_empty() {
        entries.push(String::new());
    }
    entries
}

fn push_limited(text: &mut String, ch: char) {
    if text.len() < MAX_TEXT_LEN {
        text.push(ch);
    }
}

fn pop_grapheme(text: &mut String) {
    if let Some((idx, _)) = text.grapheme_indices(true).next_back() {
        text.truncate(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn recipe_seven() -> Recipe {
        Recipe {
            id: 7,
            name: "Chicken Biryani".into(),
            cuisine: "Pakistani".into(),
            difficulty: Difficulty::Medium,
            ingredients: vec!["Rice".into(), "Chicken".into()],
            instructions: vec!["Soak".into(), "Cook".into()],
            tags: vec!["Biryani".into()],
            meal_type: vec!["Dinner".into()],
            servings: 6,
            user_id: 133,
            rating: 4.7,
            ..Recipe::default()
        }
    }

    fn typed(text: &str, form: &mut FormState) {
        for ch in text.chars() {
            form.insert_char(ch);
        }
    }

    #[test]
    fn new_form_starts_from_defaults() {
        let form = FormState::create();
        assert!(!form.is_edit());
        assert_eq!(form.servings, 1);
        assert_eq!(form.difficulty, Difficulty::Easy);
        assert_eq!(form.ingredients, vec![String::new()]);
        assert_eq!(form.meal_type, vec![String::new()]);
        assert_eq!(form.title(), "Create New Recipe");
    }

    #[test]
    fn remove_keeps_last_entry() {
        let mut form = FormState::create();
        assert!(!form.remove_entry(ListField::Tags, 0));
        form.add_entry(ListField::Tags);
        assert!(form.remove_entry(ListField::Tags, 0));
        assert_eq!(form.tags.len(), 1);
        assert!(!form.remove_entry(ListField::Tags, 5));
    }

    #[test]
    fn set_entry_replaces_in_place() {
        let mut form = FormState::edit(&recipe_seven());
        assert!(form.set_entry(ListField::Ingredients, 1, "Lamb"));
        assert_eq!(form.ingredients, vec!["Rice".to_string(), "Lamb".to_string()]);
        assert!(!form.set_entry(ListField::Ingredients, 9, "x"));
    }

    #[test]
    fn submit_strips_blank_entries_in_order() {
        let mut form = FormState::create();
        typed("Soup", &mut form);
        form.cuisine = "French".into();
        form.ingredients = vec![
            "  ".into(),
            "Leeks".into(),
            "".into(),
            "Potatoes".into(),
            "\t".into(),
        ];
        form.instructions = vec!["Chop".into(), " ".into(), "Simmer".into()];
        form.tags = vec!["".into()];

        let request = form.submit().expect("valid form");
        let fields = request.fields();
        assert_eq!(fields.ingredients, vec!["Leeks", "Potatoes"]);
        assert_eq!(fields.instructions, vec!["Chop", "Simmer"]);
        assert!(fields.tags.is_empty());
        assert!(fields.meal_type.is_empty());
    }

    #[test]
    fn editing_produces_update_with_original_id() {
        let mut form = FormState::edit(&recipe_seven());
        form.add_entry(ListField::Tags);
        let request = form.submit().expect("valid");
        assert_matches!(request, SaveRequest::Update { id: 7, ref fields } => {
            assert_eq!(fields.name, "Chicken Biryani");
            assert_eq!(fields.tags, vec!["Biryani"]);
            assert_eq!(fields.user_id, 133);
        });
    }

    #[test]
    fn creating_produces_create_without_id() {
        let mut form = FormState::create();
        form.name = "Toast".into();
        form.cuisine = "British".into();
        let request = form.submit().expect("valid");
        assert_matches!(request, SaveRequest::Create(ref fields) => {
            let json = serde_json::to_value(fields).expect("json");
            assert!(json.get("id").is_none());
        });
    }

    #[test]
    fn required_fields_are_enforced() {
        let mut form = FormState::create();
        assert_eq!(form.submit(), Err(FormError::MissingField("Recipe name")));
        form.name = "Toast".into();
        form.cuisine = "   ".into();
        assert_eq!(form.submit(), Err(FormError::MissingField("Cuisine")));
        form.cuisine = "British".into();
        form.servings = 0;
        assert_eq!(form.submit(), Err(FormError::InvalidServings));
    }

    #[test]
    fn number_fields_accept_digits_only() {
        let mut form = FormState::create();
        while form.focused() != FormField::Number(NumberField::PrepTime) {
            form.focus_next();
        }
        typed("1a5", &mut form);
        assert_eq!(form.prep_time_minutes, 15);
        form.backspace();
        assert_eq!(form.prep_time_minutes, 1);
    }

    #[test]
    fn focus_follows_added_and_removed_entries() {
        let mut form = FormState::create();
        while form.focused() != FormField::Entry(ListField::Instructions, 0) {
            form.focus_next();
        }
        assert!(form.add_entry_at_focus());
        assert_eq!(form.focused(), FormField::Entry(ListField::Instructions, 1));
        typed("Bake", &mut form);
        assert_eq!(form.instructions, vec!["".to_string(), "Bake".to_string()]);
        assert!(form.remove_entry_at_focus());
        assert_eq!(form.instructions, vec![String::new()]);
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        let mut form = FormState::create();
        typed("Cafe\u{301}", &mut form);
        form.backspace();
        assert_eq!(form.name, "Caf");
    }

    #[test]
    fn prepare_fields_validates_and_cleans() {
        let fields = RecipeFields {
            name: "Tea".into(),
            cuisine: "Chinese".into(),
            tags: vec!["".into(), "drink".into()],
            ..RecipeFields::default()
        };
        assert_eq!(prepare_fields(fields).expect("valid").tags, vec!["drink"]);
        assert_eq!(
            prepare_fields(RecipeFields::default()),
            Err(FormError::MissingField("Recipe name"))
        );
    }
}
