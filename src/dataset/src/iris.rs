use anyhow::{anyhow, ensure, Context};
use log::debug;
use nn::sample::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;
use tensorlib::functional::argmax;

pub const N_FEATURES: usize = 4;
pub const N_CLASSES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowerClass {
    #[serde(alias = "Iris-setosa")]
    Setosa,
    #[serde(alias = "Iris-versicolor")]
    Versicolor,
    #[serde(alias = "Iris-virginica")]
    Virginica,
}

impl FlowerClass {
    pub const ALL: [FlowerClass; N_CLASSES] = [
        FlowerClass::Setosa,
        FlowerClass::Versicolor,
        FlowerClass::Virginica,
    ];

    /// Target vector used for training. The hot index counts from the end:
    /// setosa is `[0, 0, 1]`, virginica is `[1, 0, 0]`.
    pub fn one_hot(self) -> Vec<f32> {
        match self {
            FlowerClass::Setosa => vec![0f32, 0f32, 1f32],
            FlowerClass::Versicolor => vec![0f32, 1f32, 0f32],
            FlowerClass::Virginica => vec![1f32, 0f32, 0f32],
        }
    }

    pub fn from_one_hot(outputs: &[f32]) -> anyhow::Result<Self> {
        ensure!(
            outputs.len() == N_CLASSES,
            "expected {} outputs, got {}",
            N_CLASSES,
            outputs.len()
        );

        Ok(match argmax(outputs) {
            0 => FlowerClass::Virginica,
            1 => FlowerClass::Versicolor,
            _ => FlowerClass::Setosa,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            FlowerClass::Setosa => "setosa",
            FlowerClass::Versicolor => "versicolor",
            FlowerClass::Virginica => "virginica",
        }
    }
}

impl fmt::Display for FlowerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Flower {
    pub sepal_length: f32,
    pub sepal_width: f32,
    pub petal_length: f32,
    pub petal_width: f32,
    pub class: FlowerClass,
}

impl Flower {
    pub fn features(&self) -> [f32; N_FEATURES] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }

    pub fn to_sample(&self) -> Sample {
        Sample::new(self.features().to_vec(), self.class.one_hot())
    }
}

pub fn parse_flowers(data: &str) -> anyhow::Result<Vec<Flower>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let flowers = reader
        .deserialize::<Flower>()
        .enumerate()
        .map(|(idx, record)| record.with_context(|| format!("invalid flower record {}", idx + 1)))
        .collect::<anyhow::Result<Vec<Flower>>>()?;

    if flowers.is_empty() {
        return Err(anyhow!("dataset contains no flowers"));
    }

    debug!("parsed {} flowers", flowers.len());

    Ok(flowers)
}

pub fn csv_to_dataset(data: &str) -> anyhow::Result<Vec<Sample>> {
    Ok(parse_flowers(data)?.iter().map(Flower::to_sample).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
sepal_length,sepal_width,petal_length,petal_width,class
5.1,3.5,1.4,0.2,setosa
7.0,3.2,4.7,1.4,versicolor
6.3,3.3,6.0,2.5,virginica
";

    #[test]
    fn test_parse_flowers() {
        let flowers = parse_flowers(CSV).unwrap();

        assert_eq!(flowers.len(), 3);
        assert_eq!(flowers[0].features(), [5.1, 3.5, 1.4, 0.2]);
        assert_eq!(
            flowers.iter().map(|f| f.class).collect::<Vec<_>>(),
            FlowerClass::ALL.to_vec()
        );
    }

    #[test]
    fn test_csv_to_dataset_one_hot_targets() {
        let dataset = csv_to_dataset(CSV).unwrap();

        assert_eq!(dataset[0].outputs, Some(vec![0.0, 0.0, 1.0]));
        assert_eq!(dataset[1].outputs, Some(vec![0.0, 1.0, 0.0]));
        assert_eq!(dataset[2].outputs, Some(vec![1.0, 0.0, 0.0]));
        assert_eq!(dataset[2].inputs, vec![6.3, 3.3, 6.0, 2.5]);
    }

    #[test]
    fn test_uci_class_names_and_whitespace() {
        let csv = "sepal_length, sepal_width, petal_length, petal_width, class\n\
                   4.9, 3.0, 1.4, 0.2, Iris-setosa\n";

        let flowers = parse_flowers(csv).unwrap();
        assert_eq!(flowers[0].class, FlowerClass::Setosa);
    }

    #[test]
    fn test_malformed_row_names_record() {
        let csv = "sepal_length,sepal_width,petal_length,petal_width,class\n\
                   5.1,3.5,1.4,0.2,setosa\n\
                   5.1,oops,1.4,0.2,setosa\n";

        let err = parse_flowers(csv).unwrap_err();
        assert_eq!(err.to_string(), "invalid flower record 2");
    }

    #[test]
    fn test_unknown_class() {
        let csv = "sepal_length,sepal_width,petal_length,petal_width,class\n\
                   5.1,3.5,1.4,0.2,rose\n";

        assert!(parse_flowers(csv).is_err());
    }

    #[test]
    fn test_empty_dataset() {
        let csv = "sepal_length,sepal_width,petal_length,petal_width,class\n";

        assert!(parse_flowers(csv).is_err());
    }

    #[test]
    fn test_one_hot_round_trip_per_class() {
        for class in FlowerClass::ALL {
            assert_eq!(FlowerClass::from_one_hot(&class.one_hot()).unwrap(), class);
        }
        assert_eq!(
            FlowerClass::from_one_hot(&[0.1, 0.7, 0.2]).unwrap(),
            FlowerClass::Versicolor
        );
        assert!(FlowerClass::from_one_hot(&[1.0]).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(FlowerClass::Virginica.to_string(), "virginica");
    }
}
