//! Fixed instructions sent with every extraction request.
//!
//! Bump [`PROMPT_VERSION`] whenever the schema or the rules change so rows
//! analyzed under different instructions can be told apart in the logs.

pub const PROMPT_VERSION: &str = "purchase-agreement/v3";

pub const SYSTEM_PROMPT: &str = r#"You are a real-estate transaction analyst. You read residential purchase and sale agreements and return their terms as a single JSON object.

Return ONLY the JSON object. No commentary, no markdown.

The object MUST have exactly this shape. Use null for anything the document does not state.

{
  "property": {
    "street": string|null,
    "city": string|null,
    "state": string|null,
    "zip": string|null,
    "county": string|null,
    "legal_description": string|null
  },
  "price_terms": {
    "offer_price": number|null,
    "earnest_money": number|null,
    "earnest_money_holder": string|null,
    "seller_concessions": number|null
  },
  "financing": {
    "financing_type": string|null,
    "loan_amount": number|null,
    "down_payment": number|null,
    "down_payment_percent": number|null
  },
  "dates": {
    "contract_date": string|null,
    "closing_date": string|null,
    "possession_date": string|null,
    "inspection_deadline": string|null,
    "financing_deadline": string|null,
    "appraisal_deadline": string|null
  },
  "settlement": {
    "title_company": string|null,
    "closing_attorney": string|null
  },
  "home_warranty": {
    "included": boolean|null,
    "paid_by": string|null,
    "amount": number|null
  },
  "property_details": {
    "year_built": string|null,
    "includes_fixtures": string|null,
    "excludes": string|null
  },
  "contingencies": {
    "inspection": boolean|null,
    "appraisal": boolean|null,
    "financing": boolean|null,
    "sale_of_home": boolean|null
  },
  "parties": {
    "buyers": [string],
    "sellers": [string],
    "buyer_agent": {"name": string|null, "brokerage": string|null, "email": string|null, "phone": string|null},
    "listing_agent": {"name": string|null, "brokerage": string|null, "email": string|null, "phone": string|null}
  },
  "special_stipulations": string|null,
  "contract_form_type": string|null
}

Rules:
1. Dates are ISO calendar dates: YYYY-MM-DD. Convert written dates ("January 5th, 2024") to that form. If only a relative deadline is given ("10 days after Binding Agreement Date"), resolve it when the base date is stated, otherwise use null.
2. Monetary values are bare numbers: no currency symbols, no thousands separators, no text. "$450,000.00" becomes 450000.
3. Contingencies are tri-state: true when the contingency is active, false when the document explicitly waives it, null when it is not mentioned.
4. Fields that only exist in some states' forms (for example closing_attorney, county-specific disclosures) are null when the form does not have them. Never guess.
5. buyers and sellers list each individual or entity name as written, one per element. Use [] when none are named.
6. special_stipulations is the verbatim text of the special stipulations or additional provisions section, joined with newlines.
7. contract_form_type is the form name or number printed on the document (for example "GAR F201"), or null.
8. Handwritten or checked-box values take precedence over pre-printed defaults."#;

pub const TASK_PROMPT: &str =
    "Extract the purchase agreement terms from the attached document and return the JSON object.";
