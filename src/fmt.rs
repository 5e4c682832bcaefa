fn with_commas(int_part: &str) -> String {
    let mut out = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

fn split_fixed(val: f64) -> (bool, String, String) {
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    (val < 0.0, with_commas(int_part), dec_part.to_string())
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let (negative, int_part, dec_part) = split_fixed(val);
    if negative {
        format!("-${int_part}.{dec_part}")
    } else {
        format!("${int_part}.{dec_part}")
    }
}

/// Format a float with thousands separators and two decimals: 1,234.56
pub fn number(val: f64) -> String {
    let (negative, int_part, dec_part) = split_fixed(val);
    if negative {
        format!("-{int_part}.{dec_part}")
    } else {
        format!("{int_part}.{dec_part}")
    }
}

/// Dollar metrics carry a "($)" suffix in their display name.
pub fn metric_value(metric: &str, val: f64) -> String {
    if metric.ends_with("($)") {
        money(val)
    } else {
        number(val)
    }
}

/// Hover descriptions carry HTML line breaks for the browser renderer.
pub fn plain_description(description: &str) -> String {
    description.replace("<br>", " ")
}
