pub fn softmax_one_row(mut row: Vec<f32>) -> Vec<f32> {
    let max = row.iter().fold(f32::NEG_INFINITY, |acc, &x| x.max(acc));
    row.iter_mut().for_each(|x| *x = (*x - max).exp());
    let sum: f32 = row.iter().sum();
    row.iter_mut().for_each(|x| *x /= sum);
    row
}

pub fn mean_squared_error(output: &[f32], target: &[f32]) -> f32 {
    assert_eq!(output.len(), target.len());

    let squared: f32 = output
        .iter()
        .zip(target.iter())
        .map(|(o, t)| (t - o) * (t - o))
        .sum();

    squared / output.len() as f32
}
