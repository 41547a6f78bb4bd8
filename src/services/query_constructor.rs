//! Natural-language query → structured filter + search text
//!
//! The model sees the attribute schema and answers with a small JSON object
//! whose `filter` field uses a function-call grammar:
//!
//! ```text
//! and(eq("genre", "drama"), gt("rating", 8))
//! ```
//!
//! Parsing is strict: unknown attributes, comparators or malformed
//! expressions are reported as `AppError::QueryParse`.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Attribute, Comparator, Filter, FilterValue, Operator, StructuredQuery},
    services::llm::ChatModel,
};

pub const DOCUMENT_DESCRIPTION: &str = "Brief summary of a movie";

const NO_FILTER: &str = "NO_FILTER";

#[derive(Debug, Deserialize)]
struct RawStructuredQuery {
    #[serde(default)]
    query: String,
    #[serde(default)]
    filter: Option<String>,
    #[serde(default)]
    limit: Option<serde_json::Value>,
}

/// Uses a chat model to translate user requests into `StructuredQuery`
pub struct QueryConstructor {
    llm: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl QueryConstructor {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self {
            llm,
            system_prompt: build_system_prompt(),
        }
    }

    pub async fn construct(&self, user_query: &str) -> AppResult<StructuredQuery> {
        let prompt = format!("User Query:\n{}\n\nStructured Request:", user_query);
        let reply = self.llm.complete(&self.system_prompt, &prompt).await?;
        let structured = parse_structured_query(&reply)?;

        let filter = structured
            .filter
            .as_ref()
            .map(|f| f.to_string())
            .unwrap_or_else(|| NO_FILTER.to_string());
        tracing::info!(
            query = %structured.query,
            filter = %filter,
            limit = ?structured.limit,
            "Query translated"
        );

        Ok(structured)
    }
}

fn build_system_prompt() -> String {
    let comparators: Vec<&str> = Comparator::ALL.iter().map(|c| c.name()).collect();
    let operators: Vec<&str> = Operator::ALL.iter().map(|o| o.name()).collect();

    let mut attributes = serde_json::Map::new();
    for attribute in Attribute::ALL {
        attributes.insert(
            attribute.name().to_string(),
            serde_json::json!({
                "description": attribute.description(),
                "type": attribute.value_type().to_string(),
            }),
        );
    }
    let attributes = serde_json::to_string_pretty(&attributes).unwrap_or_default();

    format!(
        r#"Your goal is to structure the user's query to match the request schema provided below.

<< Structured Request Schema >>
When responding use a markdown code snippet with a JSON object formatted in the following schema:

```json
{{
    "query": string \ text string to compare to document contents
    "filter": string \ logical condition statement for filtering documents
    "limit": int \ optional, the number of documents to retrieve
}}
```

The query string should contain only text that is expected to match the contents of documents. Any conditions in the filter should not be mentioned in the query as well.

A logical condition statement is composed of one or more comparison and logical operation statements.

A comparison statement takes the form: `comp(attr, val)`:
- `comp` ({comparators}): comparator
- `attr` (string): name of attribute to apply the comparison to
- `val` (string, integer, float or list): is the comparison value

A logical operation statement takes the form `op(statement1, statement2, ...)`:
- `op` ({operators}): logical operator
- `statement1`, `statement2`, ... (comparison statements or logical operation statements): one or more statements to apply the operation to

Make sure that you only use the comparators and logical operators listed above and no others.
Make sure that filters only refer to attributes that exist in the data source.
Make sure that filters take into account the descriptions of attributes and only make comparisons that are feasible given the type of data being stored.
Make sure that filters are only used as needed. If there are no filters that should be applied return "{no_filter}" for the filter value.
Only set "limit" when the user asks for a specific number of movies.

<< Example >>
User Query:
dramas rated above 8 made after 2000

Structured Request:
```json
{{
    "query": "",
    "filter": "and(eq(\"genre\", \"drama\"), gt(\"rating\", 8), gt(\"year\", 2000))"
}}
```

<< Data Source >>
```json
{{
    "content": "{description}",
    "attributes": {attributes}
}}
```"#,
        comparators = comparators.join(" | "),
        operators = operators.join(" | "),
        no_filter = NO_FILTER,
        description = DOCUMENT_DESCRIPTION,
        attributes = attributes,
    )
}

/// Pulls the JSON object out of a reply that may be wrapped in a code fence
fn extract_json(reply: &str) -> AppResult<&str> {
    let trimmed = reply.trim();

    if let Some(start) = trimmed.find("```") {
        // Optional language tag, with or without a newline after it
        let body = trimmed[start + 3..].trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let body = body.find("```").map_or(body, |end| &body[..end]);
        return Ok(body.trim());
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(AppError::QueryParse(format!(
            "no JSON object in model reply: {}",
            trimmed
        ))),
    }
}

/// Parses the model's structured request reply
pub fn parse_structured_query(reply: &str) -> AppResult<StructuredQuery> {
    let json = extract_json(reply)?;
    let raw: RawStructuredQuery = serde_json::from_str(json)
        .map_err(|e| AppError::QueryParse(format!("invalid structured request: {}", e)))?;

    let filter = match raw.filter.as_deref().map(str::trim) {
        None | Some("") | Some(NO_FILTER) => None,
        Some(expression) => Some(parse_filter(expression)?),
    };

    let query = raw.query.trim();
    let query = if query == NO_FILTER { "" } else { query };

    Ok(StructuredQuery {
        query: query.to_string(),
        filter,
        limit: raw.limit.as_ref().and_then(parse_limit),
    })
}

/// Accepts `2` or `"2"`; anything else means no limit
fn parse_limit(value: &serde_json::Value) -> Option<usize> {
    let limit = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if limit.is_none() && !value.is_null() {
        tracing::debug!(limit = %value, "Ignoring unusable limit");
    }
    limit.filter(|l| *l > 0)
}

/// Parses a filter expression such as `and(eq("genre", "drama"), gt("rating", 8))`
pub fn parse_filter(expression: &str) -> AppResult<Filter> {
    let mut parser = FilterParser::new(expression);
    let filter = parser.expression()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(filter)
}

struct FilterParser {
    chars: Vec<char>,
    pos: usize,
}

impl FilterParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: &str) -> AppError {
        let input: String = self.chars.iter().collect();
        AppError::QueryParse(format!("{} at {} in `{}`", message, self.pos, input))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> AppResult<()> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected `{}`", expected)))
        }
    }

    /// Consumes `c` if it is next, skipping whitespace
    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> AppResult<String> {
        self.skip_whitespace();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn expression(&mut self) -> AppResult<Filter> {
        let name = self.identifier()?;
        self.expect('(')?;

        if let Some(operator) = Operator::from_name(&name) {
            let mut arguments = vec![self.expression()?];
            while self.eat(',') {
                arguments.push(self.expression()?);
            }
            self.expect(')')?;
            return Ok(Filter::Operation {
                operator,
                arguments,
            });
        }

        let comparator = Comparator::from_name(&name)
            .ok_or_else(|| self.error(&format!("unknown function `{}`", name)))?;
        let attribute_name = self.attribute_name()?;
        let attribute = Attribute::from_name(&attribute_name)
            .ok_or_else(|| self.error(&format!("unknown attribute `{}`", attribute_name)))?;
        self.expect(',')?;
        let value = self.value()?;
        self.expect(')')?;

        Ok(Filter::comparison(comparator, attribute, value))
    }

    /// Attribute names may be quoted or bare
    fn attribute_name(&mut self) -> AppResult<String> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') | Some('\'') => self.string(),
            _ => self.identifier(),
        }
    }

    fn value(&mut self) -> AppResult<FilterValue> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') | Some('\'') => Ok(FilterValue::Text(self.string()?)),
            Some('[') => {
                self.pos += 1;
                let mut items = Vec::new();
                if !self.eat(']') {
                    items.push(self.value()?);
                    while self.eat(',') {
                        items.push(self.value()?);
                    }
                    self.expect(']')?;
                }
                Ok(FilterValue::List(items))
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(_) => match self.identifier()?.to_lowercase().as_str() {
                "true" => Ok(FilterValue::Bool(true)),
                "false" => Ok(FilterValue::Bool(false)),
                other => Err(self.error(&format!("unexpected value `{}`", other))),
            },
            None => Err(self.error("expected value")),
        }
    }

    fn string(&mut self) -> AppResult<String> {
        let quote = self.peek().ok_or_else(|| self.error("expected string"))?;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn number(&mut self) -> AppResult<FilterValue> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();

        if literal.contains('.') {
            literal
                .parse()
                .map(FilterValue::Float)
                .map_err(|_| self.error(&format!("invalid number `{}`", literal)))
        } else {
            literal
                .parse()
                .map(FilterValue::Integer)
                .map_err(|_| self.error(&format!("invalid number `{}`", literal)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::MockChatModel;

    #[test]
    fn test_parse_single_comparison() {
        let filter = parse_filter(r#"eq("director", "Rajkumar Hirani")"#).unwrap();
        assert_eq!(
            filter,
            Filter::comparison(
                Comparator::Eq,
                Attribute::Director,
                FilterValue::Text("Rajkumar Hirani".to_string())
            )
        );
    }

    #[test]
    fn test_parse_nested_operation() {
        let filter =
            parse_filter(r#"and(eq("genre", "drama"), or(gt("rating", 8.5), gte('year', 2015)))"#)
                .unwrap();
        assert_eq!(
            filter.to_string(),
            r#"and(eq("genre", "drama"), or(gt("rating", 8.5), gte("year", 2015)))"#
        );
    }

    #[test]
    fn test_parse_bare_attribute_and_list() {
        let filter = parse_filter(r#"in(genre, ["war", "musical"])"#).unwrap();
        assert_eq!(
            filter,
            Filter::comparison(
                Comparator::In,
                Attribute::Genre,
                FilterValue::List(vec![
                    FilterValue::Text("war".to_string()),
                    FilterValue::Text("musical".to_string()),
                ])
            )
        );
    }

    #[test]
    fn test_parse_negative_and_escaped() {
        let filter = parse_filter(r#"ne("director", "R. \"Balki\"")"#).unwrap();
        assert_eq!(
            filter,
            Filter::comparison(
                Comparator::Ne,
                Attribute::Director,
                FilterValue::Text("R. \"Balki\"".to_string())
            )
        );

        let filter = parse_filter("gt(year, -5)").unwrap();
        assert_eq!(
            filter,
            Filter::comparison(Comparator::Gt, Attribute::Year, FilterValue::Integer(-5))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_attribute() {
        let err = parse_filter(r#"eq("budget", 10)"#).unwrap_err();
        assert!(matches!(err, AppError::QueryParse(_)));
        assert!(err.to_string().contains("unknown attribute `budget`"));
    }

    #[test]
    fn test_parse_rejects_unknown_function_and_garbage() {
        assert!(parse_filter(r#"between("year", 1990, 2000)"#).is_err());
        assert!(parse_filter(r#"eq("genre", "drama""#).is_err());
        assert!(parse_filter(r#"eq("genre", "drama") extra"#).is_err());
        assert!(parse_filter("and()").is_err());
    }

    #[test]
    fn test_structured_query_from_fenced_reply() {
        let reply = "```json\n{\n    \"query\": \"college life\",\n    \"filter\": \"gt(\\\"rating\\\", 9)\"\n}\n```";
        let structured = parse_structured_query(reply).unwrap();
        assert_eq!(structured.query, "college life");
        assert_eq!(
            structured.filter,
            Some(Filter::comparison(
                Comparator::Gt,
                Attribute::Rating,
                FilterValue::Integer(9)
            ))
        );
        assert_eq!(structured.limit, None);
    }

    #[test]
    fn test_structured_query_no_filter() {
        let reply = r#"Sure! {"query": "army officer", "filter": "NO_FILTER", "limit": 2}"#;
        let structured = parse_structured_query(reply).unwrap();
        assert_eq!(structured.query, "army officer");
        assert_eq!(structured.filter, None);
        assert_eq!(structured.limit, Some(2));
    }

    #[test]
    fn test_structured_query_from_single_line_fence() {
        let reply = r#"```json {"query": "", "filter": "eq(\"genre\", \"drama\")"} ```"#;
        let structured = parse_structured_query(reply).unwrap();
        assert_eq!(structured.query, "");
        assert_eq!(
            structured.filter,
            Some(Filter::comparison(
                Comparator::Eq,
                Attribute::Genre,
                FilterValue::Text("drama".to_string())
            ))
        );

        let untagged = parse_structured_query(r#"```{"query": "heist", "filter": "NO_FILTER"}```"#)
            .unwrap();
        assert_eq!(untagged.query, "heist");
    }

    #[test]
    fn test_quoted_limit_is_accepted() {
        let structured =
            parse_structured_query(r#"{"query": "war", "filter": "NO_FILTER", "limit": "2"}"#)
                .unwrap();
        assert_eq!(structured.limit, Some(2));

        let structured =
            parse_structured_query(r#"{"query": "war", "filter": "NO_FILTER", "limit": "a few"}"#)
                .unwrap();
        assert_eq!(structured.query, "war");
        assert_eq!(structured.limit, None);

        let structured =
            parse_structured_query(r#"{"query": "war", "filter": "NO_FILTER", "limit": null}"#)
                .unwrap();
        assert_eq!(structured.limit, None);
    }

    #[test]
    fn test_uppercase_function_names_parse() {
        let filter = parse_filter(r#"AND(EQ("genre", "drama"), Gt("rating", 8))"#).unwrap();
        assert_eq!(
            filter.to_string(),
            r#"and(eq("genre", "drama"), gt("rating", 8))"#
        );
    }

    #[test]
    fn test_structured_query_rejects_prose() {
        let err = parse_structured_query("I cannot help with that.").unwrap_err();
        assert!(matches!(err, AppError::QueryParse(_)));
    }

    #[test]
    fn test_system_prompt_describes_schema() {
        let prompt = build_system_prompt();
        for attribute in Attribute::ALL {
            assert!(prompt.contains(attribute.name()));
            assert!(prompt.contains(attribute.description()));
        }
        assert!(prompt.contains("eq | ne | gt"));
        assert!(prompt.contains("and | or | not"));
        assert!(prompt.contains(DOCUMENT_DESCRIPTION));
    }

    #[tokio::test]
    async fn test_construct_sends_user_query() {
        let mut llm = MockChatModel::new();
        llm.expect_complete()
            .withf(|_, user| user.contains("movies by Kabir Khan"))
            .times(1)
            .returning(|_, _| {
                Ok(r#"{"query": "", "filter": "eq(\"director\", \"Kabir Khan\")"}"#.to_string())
            });

        let constructor = QueryConstructor::new(Arc::new(llm));
        let structured = constructor.construct("movies by Kabir Khan").await.unwrap();

        assert_eq!(structured.query, "");
        assert!(structured.filter.is_some());
    }
}
