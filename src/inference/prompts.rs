// ABOUTME: Prompt texts sent to the model by the recipe inference flows
// ABOUTME: Each flow asks for one JSON document matching the recipe or planning shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// JSON shape appended to every recipe-producing prompt
const RECIPE_JSON_SHAPE: &str = r#"Answer with a single JSON object using these fields, omitting any you cannot determine:
{"title": string, "description": string, "category": "Entrée" | "Plat Principal" | "Dessert" | "Boisson" | "Apéritif" | "Autre", "prepTime": minutes, "cookTime": minutes, "servings": number, "ingredients": [{"name": string, "quantity": string}], "steps": [string]}"#;

/// JSON shape of the planner answer
const PLANNING_JSON_SHAPE: &str = r#"Answer with a single JSON object:
{"eventName": string, "meals": [{"recipeId": string (when isNew is false), "isNew": boolean, "newRecipeDetails": {"title", "description", "category", "prepTime", "cookTime", "servings", "ingredients": [{"name", "quantity"}], "steps"} (only when isNew is true), "day": number starting at 1, "meal": "Midi" | "Soir", "mealType": "Entrée" | "Plat Principal" | "Dessert"}]}"#;

pub fn generate_recipe_user_prompt(user_input: &str) -> String {
    format!("Based on the user's request, generate a new recipe.\n\nUser Request: {user_input}\n\n{RECIPE_JSON_SHAPE}")
}

pub fn url_import_prompt(url: &str, page_text: Option<&str>) -> String {
    let mut prompt = format!("You are an expert recipe scraper. Scrape the recipe from the provided URL.\nURL: {url}\n");
    if let Some(text) = page_text {
        prompt.push_str("\nPage content:\n");
        prompt.push_str(text);
        prompt.push('\n');
    }
    prompt.push('\n');
    prompt.push_str(RECIPE_JSON_SHAPE);
    prompt
}

pub fn photo_import_prompt() -> String {
    format!("You are an expert recipe transcriber. Extract the recipe details from the provided image.\n\n{RECIPE_JSON_SHAPE}")
}

pub fn planning_system_prompt(duration: u32, constraints: &str) -> String {
    format!(
        r#"You are an expert meal planner. Your task is to create a balanced meal plan.

CRITICAL RULES:
1. Only use recipes from the list IF they match the constraints: "{constraints}".
2. If you need a recipe that isn't in the list, set 'isNew: true' and provide FULL 'newRecipeDetails'.
3. DO NOT include meta-talk, instructions, or disclaimers like "[NEW RECIPE]" or "Generated because..." in the title or description.
4. The title must be ONLY the name of the dish.
5. 'newRecipeDetails' MUST contain non-empty ingredients and steps if 'isNew' is true.

Duration: {duration} days.
Constraints: {constraints}

{PLANNING_JSON_SHAPE}"#
    )
}

pub fn planning_user_prompt(recipes_json: &str) -> String {
    format!("Available Recipes: {recipes_json}\n\nGenerate the meal plan now.")
}
