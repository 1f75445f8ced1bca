/// Index of the first maximum, so ties resolve to the lowest index.
pub fn argmax<T: PartialOrd>(values: impl Iterator<Item = T>) -> Option<usize> {
    let mut result: Option<(usize, T)> = None;
    for (i, v) in values.enumerate() {
        let is_new_max: bool = match &result {
            Some((_, max)) => v > *max,
            None => true,
        };
        if is_new_max {
            result = Some((i, v));
        }
    }
    result.map(|(i, _)| i)
}

pub fn max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn moving_average(window: usize, vector: &[f64]) -> Vec<f64> {
    let window: usize = window.max(1);
    let mut aux: usize = 0;
    let mut result: Vec<f64> = vec![];
    while aux < vector.len() {
        let end: usize = if aux + window < vector.len() {
            aux + window
        } else {
            vector.len()
        };
        let slice: &[f64] = &vector[aux..end];
        let r: f64 = slice.iter().sum();
        result.push(r / slice.len() as f64);
        aux = end;
    }
    result
}
