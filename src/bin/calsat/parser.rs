use calsat::cmp::Operator;
use calsat::constraint::{DateConstraint, DATE_FORMAT};
use calsat::solver::Solver;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;

pub struct ModelParseResult {
    pub solver: Solver,
    /// Display name of each meeting, by index.
    pub names: Vec<String>,
}

fn date(json: &serde_json::Value, what: &str) -> Result<NaiveDate, String> {
    let s = json
        .as_str()
        .ok_or_else(|| format!("{} is not a string.", what))?;
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| format!("{} '{}' is not a YYYY-MM-DD date.", what, s))
}

/// A meeting given by name or by index.
fn meeting_token(token: &str, names: &FxHashMap<String, usize>) -> Option<usize> {
    names
        .get(token)
        .copied()
        .or_else(|| token.parse::<usize>().ok())
}

fn meeting_ref(
    json: &serde_json::Value,
    names: &FxHashMap<String, usize>,
) -> Result<usize, String> {
    if let Some(i) = json.as_u64() {
        Ok(i as usize)
    } else if let Some(s) = json.as_str() {
        meeting_token(s, names)
            .ok_or_else(|| format!("references meeting {}, but it doesn't exist.", s))
    } else {
        Err("meeting reference is not a name or an index.".to_string())
    }
}

/// `"left op right"`; meeting names are replaced by their indices before parsing.
fn text_constraint(s: &str, names: &FxHashMap<String, usize>) -> Result<DateConstraint, String> {
    let tokens = s
        .split_whitespace()
        .enumerate()
        .map(|(i, t)| match meeting_token(t, names) {
            Some(index) if i != 1 => index.to_string(),
            _ => t.to_string(),
        })
        .collect::<Vec<_>>();
    tokens
        .join(" ")
        .parse::<DateConstraint>()
        .map_err(|e| format!("constraint '{}': {}", s, e))
}

fn object_constraint(
    c: &serde_json::Map<String, serde_json::Value>,
    names: &FxHashMap<String, usize>,
) -> Result<DateConstraint, String> {
    let left = c
        .get("left")
        .ok_or_else(|| "constraint has no field 'left'.".to_string())
        .and_then(|l| meeting_ref(l, names))?;
    let op = c
        .get("op")
        .and_then(|o| o.as_str())
        .ok_or_else(|| "constraint has no string field 'op'.".to_string())?
        .parse::<Operator>()
        .map_err(|e| e.to_string())?;
    match (c.get("right"), c.get("date")) {
        (Some(r), None) => Ok(DateConstraint::binary(op, left, meeting_ref(r, names)?)),
        (None, Some(d)) => Ok(DateConstraint::unary(op, left, date(d, "constraint date")?)),
        _ => Err("constraint must have exactly one of 'right' and 'date'.".to_string()),
    }
}

pub fn parse(json: serde_json::Value) -> Result<ModelParseResult, String> {
    let meetings = json
        .get("meetings")
        .ok_or_else(|| "missing required field 'meetings'.".to_string())?;
    let names = if let Some(n) = meetings.as_u64() {
        (0..n).map(|i| format!("meeting_{}", i)).collect::<Vec<_>>()
    } else if let Some(arr) = meetings.as_array() {
        arr.iter()
            .map(|x| {
                x.as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| "meeting names must be strings.".to_string())
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        return Err("'meetings' is neither a count nor an array of names.".to_string());
    };
    let mut by_name = FxHashMap::default();
    for (i, name) in names.iter().enumerate() {
        if by_name.insert(name.clone(), i).is_some() {
            return Err(format!("meeting {} is declared twice.", name));
        }
    }

    let range = json
        .get("range")
        .and_then(|r| r.as_object())
        .ok_or_else(|| "missing required mapping 'range'.".to_string())?;
    let start = date(
        range
            .get("start")
            .ok_or_else(|| "'range' has no field 'start'.".to_string())?,
        "range start",
    )?;
    let end = date(
        range
            .get("end")
            .ok_or_else(|| "'range' has no field 'end'.".to_string())?,
        "range end",
    )?;
    let mut solver = Solver::new(names.len(), start, end).map_err(|e| e.to_string())?;

    if let Some(cons_json) = json.get("constraints") {
        let cons = cons_json
            .as_array()
            .ok_or_else(|| "'constraints' is not an array.".to_string())?;
        for (i, c0) in cons.iter().enumerate() {
            let c = if let Some(s) = c0.as_str() {
                text_constraint(s, &by_name)
            } else if let Some(obj) = c0.as_object() {
                object_constraint(obj, &by_name)
            } else {
                Err("not a string or a mapping.".to_string())
            }
            .map_err(|e| format!("constraints[{}]: {}", i, e))?;
            solver
                .add_constraint(c)
                .map_err(|e| format!("constraints[{}]: {}", i, e))?;
        }
    }
    Ok(ModelParseResult { solver, names })
}
