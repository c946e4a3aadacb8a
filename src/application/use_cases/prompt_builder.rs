//! System-instruction builder for SQL synthesis.
//!
//! The relationship appendix, rules, and worked examples are fixed text
//! tied to the invoice-analytics schema. The worked examples are part of
//! the contract: dropping them measurably degrades synthesis quality.

use crate::domain::schema::SchemaDescription;
use std::fmt::Write;

const PREAMBLE: &str =
    "You are a PostgreSQL expert. Generate ONLY the SQL query, no explanations or markdown.";

const RELATIONSHIPS: &str = r#"Key Relationships:
- Document.id → Invoice.documentId
- Invoice.vendorId → Vendor.id
- Invoice.customerId → Customer.id
- Invoice.id → LineItem.invoiceId
- Invoice.id → Payment.invoiceId
- Invoice.id → Summary.invoiceId
"#;

const RULES: &str = r#"CRITICAL RULES:
1. ALL table and column names MUST use double quotes: "TableName", "columnName"
2. Use ABS() for invoice amounts to get positive values
3. Table names are case-sensitive: "Invoice" not "invoice"
4. For aggregations, always use proper GROUP BY
5. For dates, use PostgreSQL date functions
"#;

const EXAMPLES: &str = r#"Example Queries:
Q: Total spend
A: SELECT SUM(ABS("invoiceTotal")) as total_spend FROM "Summary"

Q: Top 5 vendors
A: SELECT v.name, SUM(ABS(s."invoiceTotal")) as total FROM "Vendor" v JOIN "Invoice" i ON v.id = i."vendorId" JOIN "Summary" s ON i.id = s."invoiceId" GROUP BY v.name ORDER BY total DESC LIMIT 5

Q: Recent invoices
A: SELECT i."invoiceNumber", v.name as vendor, i."invoiceDate", ABS(s."invoiceTotal") as amount FROM "Invoice" i JOIN "Vendor" v ON i."vendorId" = v.id JOIN "Summary" s ON i.id = s."invoiceId" ORDER BY i."invoiceDate" DESC LIMIT 10

Q: Invoices from last 90 days
A: SELECT i."invoiceNumber", v.name, i."invoiceDate", ABS(s."invoiceTotal") as amount FROM "Invoice" i JOIN "Vendor" v ON i."vendorId" = v.id JOIN "Summary" s ON i.id = s."invoiceId" WHERE i."invoiceDate" >= CURRENT_DATE - INTERVAL '90 days' ORDER BY i."invoiceDate" DESC
"#;

const CLOSING: &str = "Generate SQL for this question. Return ONLY the SQL query:";

/// Renders a [`SchemaDescription`] plus the fixed appendices into the
/// system instruction for the LLM. Pure and deterministic: identical input
/// yields byte-identical output.
pub struct SqlPromptBuilder;

impl SqlPromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, schema: &SchemaDescription) -> String {
        let mut prompt = String::new();

        writeln!(prompt, "{}\n", PREAMBLE).unwrap();
        self.add_schema(&mut prompt, schema);
        writeln!(prompt, "{}", RELATIONSHIPS).unwrap();
        writeln!(prompt, "{}", RULES).unwrap();
        writeln!(prompt, "{}", EXAMPLES).unwrap();
        write!(prompt, "{}", CLOSING).unwrap();

        prompt
    }

    fn add_schema(&self, prompt: &mut String, schema: &SchemaDescription) {
        writeln!(prompt, "PostgreSQL Database Schema:\n").unwrap();

        for table in &schema.tables {
            writeln!(prompt, "Table \"{}\":", table.name).unwrap();
            for column in &table.columns {
                writeln!(prompt, "  - \"{}\" ({})", column.name, column.data_type).unwrap();
            }
            writeln!(prompt).unwrap();
        }
    }
}

impl Default for SqlPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
