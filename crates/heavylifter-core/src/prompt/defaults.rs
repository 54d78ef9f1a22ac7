//! Built-in prompts.
//!
//! Query-writer prompts take `{input}`, `{table_info}` and `{top_k}`; the
//! GraphQL one additionally needs `{gqlSchema}`. Answer prompts take
//! `{question}`, `{query}` and `{result}`.

use heavylifter_types::error::PromptError;
use heavylifter_types::llm::MessageRole;
use heavylifter_types::sql::Dialect;

use super::chat::ChatPromptTemplate;
use super::template::PromptTemplate;

const QUERY_SUFFIX: &str = "Only use the following tables:\n{table_info}\n\nQuestion: {input}";

const MYSQL_QUERY: &str = "You are a MySQL expert. Given an input question, first create a syntactically correct MySQL query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most {top_k} results using the LIMIT clause as per MySQL. You can order the results to return the most informative data in the database.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in backticks (`) to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use CURDATE() function to get the current date, if the question involves \"today\".

Use the following format:

Question: Question here
SQLQuery: SQL Query to run
SQLResult: Result of the SQLQuery
Answer: Final answer here

";

const SQLITE_QUERY: &str = "You are a SQLite expert. Given an input question, first create a syntactically correct SQLite query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most {top_k} results using the LIMIT clause as per SQLite. You can order the results to return the most informative data in the database.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in double quotes (\") to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use date('now') function to get the current date, if the question involves \"today\".

Use the following format:

Question: Question here
SQLQuery: SQL Query to run
SQLResult: Result of the SQLQuery
Answer: Final answer here

";

const GRAPHQL_QUERY: &str = "You are an expert in GraphQL and SQL queries who understands the following GraphQL schema
{gqlSchema}.

Given a GraphQL query from the above schema, create a syntactically correct MySQL query to run, then look at the results of the query and return the answer

Never query for all the columns from a specific table, only ask for a the few relevant columns given the question.

Pay attention to use only the column names that you can see in the schema description. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.

Use the following format:

Question: Question here
SQLQuery: SQL Query to run
SQLResult: Result of the SQLQuery
Answer: Final answer here

";

const ANSWER_BODY: &str = "Given the following user question, corresponding SQL query, and SQL result, answer the user question.

Question: {question}
SQL Query: {query}
SQL Result: {result}
Answer:

";

/// Query-writer prompt for MySQL.
pub fn mysql_query_prompt() -> Result<PromptTemplate, PromptError> {
    Ok(PromptTemplate::from_template(MYSQL_QUERY)?.concat(PromptTemplate::from_template(QUERY_SUFFIX)?))
}

/// Query-writer prompt for SQLite.
pub fn sqlite_query_prompt() -> Result<PromptTemplate, PromptError> {
    Ok(PromptTemplate::from_template(SQLITE_QUERY)?.concat(PromptTemplate::from_template(QUERY_SUFFIX)?))
}

/// Query-writer prompt matching the database dialect.
pub fn query_prompt_for(dialect: Dialect) -> Result<PromptTemplate, PromptError> {
    match dialect {
        Dialect::Mysql => mysql_query_prompt(),
        Dialect::Sqlite => sqlite_query_prompt(),
    }
}

/// Prompt that turns a GraphQL query into SQL against the mapped tables.
pub fn graphql_query_prompt() -> Result<PromptTemplate, PromptError> {
    Ok(PromptTemplate::from_template(GRAPHQL_QUERY)?.concat(PromptTemplate::from_template(QUERY_SUFFIX)?))
}

pub fn answer_prompt() -> Result<PromptTemplate, PromptError> {
    PromptTemplate::from_template(&format!(
        "{ANSWER_BODY}Make sure the answer is a user friendly text"
    ))
}

pub fn graphql_answer_prompt() -> Result<PromptTemplate, PromptError> {
    PromptTemplate::from_template(&format!(
        "{ANSWER_BODY}Make sure the answer follows the GraphQL response spec"
    ))
}

pub fn translation_prompt() -> Result<ChatPromptTemplate, PromptError> {
    ChatPromptTemplate::from_messages(vec![
        (
            MessageRole::System,
            "You are a helpful assistant that translates {input_language} to {output_language}.",
        ),
        (MessageRole::User, "{input}"),
    ])
}
