use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::relu,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TabularMlpConfig {
    pub input_dim:   usize,
    pub output_dim:  usize,
    pub hidden_dims: Vec<usize>,
    #[config(default = 0.2)]
    pub dropout:     f64,
}

impl TabularMlpConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TabularMlp<B> {
        let mut hidden = Vec::with_capacity(self.hidden_dims.len());
        let mut width  = self.input_dim;
        for &dim in &self.hidden_dims {
            hidden.push(LinearConfig::new(width, dim).init(device));
            width = dim;
        }
        let head    = LinearConfig::new(width, self.output_dim).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        TabularMlp { hidden, head, dropout }
    }
}

/// Fully connected baseline: (Linear → ReLU → Dropout)* → Linear.
/// Outputs are raw logits / standardized values; the task decides
/// which activation and loss apply.
#[derive(Module, Debug)]
pub struct TabularMlp<B: Backend> {
    pub hidden:  Vec<Linear<B>>,
    pub head:    Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> TabularMlp<B> {
    /// features: [batch, input_dim] → [batch, output_dim]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = features;
        for layer in &self.hidden {
            x = self.dropout.forward(relu(layer.forward(x)));
        }
        self.head.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model: TabularMlp<NdArray> = TabularMlpConfig::new(4, 3, vec![8, 8]).init(&device);
        let x = Tensor::<NdArray, 2>::zeros([5, 4], &device);
        assert_eq!(model.forward(x).dims(), [5, 3]);
    }

    #[test]
    fn test_no_hidden_layers_is_linear() {
        let device = Default::default();
        let model: TabularMlp<NdArray> = TabularMlpConfig::new(2, 1, vec![]).init(&device);
        assert!(model.hidden.is_empty());
        let x = Tensor::<NdArray, 2>::ones([1, 2], &device);
        assert_eq!(model.forward(x).dims(), [1, 1]);
    }
}
