//! Prompt templates mirroring the tool catalog
//!
//! Rendering is pure text assembly: no upstream calls, no shared state.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::tools::{
    coin_selection, get_coin_list_descriptor, get_market_data_descriptor, get_price_descriptor,
    get_trending_descriptor, markets_query,
};
use super::types::{bind_arguments, BoundArguments, ParamSpec, PromptDescriptor};
use crate::error::{PromptError, ProviderError, ToolError};

/// Renders the instruction text from bound arguments
pub type RenderFn = fn(&BoundArguments) -> Result<String, ToolError>;

struct Prompt {
    descriptor: PromptDescriptor,
    params: Vec<ParamSpec>,
    render: RenderFn,
}

/// Rendered `prompts/get` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub description: String,
    pub text: String,
}

impl RenderedPrompt {
    pub fn to_json(&self) -> Value {
        json!({
            "description": self.description,
            "messages": [{
                "role": "user",
                "content": {
                    "type": "text",
                    "text": self.text,
                }
            }]
        })
    }
}

/// Name → prompt table. Built once at startup, read-only afterwards.
#[derive(Default)]
pub struct PromptRegistry {
    prompts: Vec<Prompt>,
    index: HashMap<&'static str, usize>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One prompt per built-in tool, sharing its parameter list
    pub fn builtin() -> Result<Self, ProviderError> {
        let mut registry = Self::new();

        let list = get_coin_list_descriptor();
        registry.register(
            PromptDescriptor::mirroring(&list, "Instruction to list every coin CoinGecko knows"),
            list.params,
            render_coin_list,
        )?;

        let price = get_price_descriptor();
        registry.register(
            PromptDescriptor::mirroring(&price, "Instruction to look up current coin prices"),
            price.params,
            render_price,
        )?;

        let markets = get_market_data_descriptor();
        registry.register(
            PromptDescriptor::mirroring(&markets, "Instruction to fetch coin market data"),
            markets.params,
            render_market_data,
        )?;

        let trending = get_trending_descriptor();
        registry.register(
            PromptDescriptor::mirroring(&trending, "Instruction to show trending coins"),
            trending.params,
            render_trending,
        )?;

        Ok(registry)
    }

    pub fn register(
        &mut self,
        descriptor: PromptDescriptor,
        params: Vec<ParamSpec>,
        render: RenderFn,
    ) -> Result<(), ProviderError> {
        if self.index.contains_key(descriptor.name) {
            return Err(ProviderError::DuplicatePrompt(descriptor.name.to_string()));
        }

        self.index.insert(descriptor.name, self.prompts.len());
        self.prompts.push(Prompt {
            descriptor,
            params,
            render,
        });
        Ok(())
    }

    pub fn list(&self) -> Vec<&PromptDescriptor> {
        self.prompts.iter().map(|p| &p.descriptor).collect()
    }

    /// Renders prompt `name` with the caller's arguments
    pub fn get_prompt(&self, name: &str, arguments: &Value) -> Result<RenderedPrompt, PromptError> {
        let prompt = self
            .index
            .get(name)
            .map(|&i| &self.prompts[i])
            .ok_or_else(|| PromptError::PromptNotFound(name.to_string()))?;

        let args = bind_arguments(&prompt.params, arguments)?;
        let text = (prompt.render)(&args)?;

        Ok(RenderedPrompt {
            description: prompt.descriptor.description.to_string(),
            text,
        })
    }
}

// ========== Renderers ==========

fn render_coin_list(_args: &BoundArguments) -> Result<String, ToolError> {
    Ok("List all coins available on CoinGecko with their ids, symbols and names.".to_string())
}

fn render_price(args: &BoundArguments) -> Result<String, ToolError> {
    // same validation as the tool, so an unusable instruction is never produced
    coin_selection(args)?;

    let mut coins = Vec::new();
    if let Some(ids) = args.str("ids").filter(|_| args.was_supplied("ids")) {
        coins.push(format!("ids {}", ids));
    }
    if let Some(symbols) = args.str("symbols").filter(|_| args.was_supplied("symbols")) {
        coins.push(format!("symbols {}", symbols));
    }

    Ok(format!(
        "Get the current price of the coins with {} in {}.",
        coins.join(" and "),
        args.str("vs_currencies").unwrap_or("usd")
    ))
}

fn render_market_data(args: &BoundArguments) -> Result<String, ToolError> {
    let query = markets_query(args)?;

    let mut text = format!("Get cryptocurrency market data in {}", query.vs_currency);

    if let Some(ids) = &query.ids {
        text.push_str(&format!(" for the coins {}", ids));
    }
    if let Some(category) = &query.category {
        text.push_str(&format!(" in the category {}", category));
    }
    if args.was_supplied("order") {
        text.push_str(&format!(", sorted by {}", query.order));
    }
    if args.was_supplied("per_page") {
        text.push_str(&format!(", {} results per page", query.per_page));
    }
    if args.was_supplied("page") {
        text.push_str(&format!(", page {}", query.page));
    }
    if args.was_supplied("sparkline") {
        if query.sparkline {
            text.push_str(", including sparkline data");
        } else {
            text.push_str(", without sparkline data");
        }
    }
    text.push('.');

    Ok(text)
}

fn render_trending(_args: &BoundArguments) -> Result<String, ToolError> {
    Ok("Show the coins trending on CoinGecko in the last 24 hours.".to_string())
}
