use chrono::{DateTime, NaiveDate, Utc};

/// A runtime value produced by evaluating a TSL expression.
///
/// Values come from two places: literal leaves of the AST, and the
/// caller-supplied resolver that maps identifier names to record fields.
/// Arrays only ever arise from array literals or from resolution; a
/// scalar leaf never evaluates to an array.
///
/// # Examples
///
/// ```
/// use tsl::Value;
///
/// let n = Value::Number(42.0);
/// let s = Value::Str("A good book".to_string());
/// let tags = Value::Array(vec![
///     Value::Str("fiction".to_string()),
///     Value::Str("bestseller".to_string()),
/// ]);
/// assert_eq!(n.type_name(), "number");
/// assert_eq!(s.type_name(), "string");
/// assert_eq!(tags.type_name(), "array");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or SQL NULL
    Null,

    /// Boolean (true/false)
    Bool(bool),

    /// Floating-point number; integral record fields widen to this
    Number(f64),

    /// UTF-8 string
    Str(String),

    /// Civil date without a time of day
    Date(NaiveDate),

    /// Date and time with a UTC offset
    Timestamp(DateTime<chrono::FixedOffset>),

    /// Ordered sequence of values
    Array(Vec<Value>),
}

impl Value {
    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The instant a date-typed value names, for chronological
    /// comparison. A civil date counts as midnight UTC.
    pub(crate) fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)),
            Value::Timestamp(ts) => Some(ts.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Convert a JSON value into a TSL value.
    ///
    /// Numbers widen to `Number`, arrays convert element-wise. JSON
    /// objects have no scalar representation and yield `None`; use
    /// [`resolver`] to address fields inside an object.
    ///
    /// # Examples
    ///
    /// ```
    /// use tsl::Value;
    ///
    /// let json: serde_json::Value = serde_json::json!([1, 2, 3]);
    /// assert_eq!(
    ///     Value::from_json(&json),
    ///     Some(Value::Array(vec![
    ///         Value::Number(1.0),
    ///         Value::Number(2.0),
    ///         Value::Number(3.0),
    ///     ]))
    /// );
    /// ```
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            serde_json::Value::Object(_) => None,
        }
    }
}

/// Build a resolver over a JSON document, suitable for
/// [`semantics::evaluate`](crate::semantics::evaluate).
///
/// An identifier is first looked up verbatim as a top-level key, then as
/// a dotted path into nested objects, so both `{"spec.pages": 14}` and
/// `{"spec": {"pages": 14}}` answer `spec.pages`.
///
/// # Examples
///
/// ```
/// use tsl::{resolver, Value};
///
/// let doc = serde_json::json!({"spec": {"pages": 14}});
/// let resolve = resolver(&doc);
/// assert_eq!(resolve("spec.pages"), Some(Value::Number(14.0)));
/// assert_eq!(resolve("spec.missing"), None);
/// ```
pub fn resolver(doc: &serde_json::Value) -> impl Fn(&str) -> Option<Value> + '_ {
    move |name: &str| {
        if let Some(direct) = doc.get(name) {
            return Value::from_json(direct);
        }

        let mut current = doc;
        for segment in name.split('.') {
            current = current.get(segment)?;
        }
        Value::from_json(current)
    }
}
