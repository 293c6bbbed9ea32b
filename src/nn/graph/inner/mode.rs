/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 训练/推理模式
 *                 训练模式下 Dropout 按 dropout_rng 采样掩码；推理模式下 Dropout 为恒等映射
 */

use super::GraphInner;

impl GraphInner {
    pub const fn set_train_mode(&mut self) {
        self.training = true;
    }

    pub const fn set_eval_mode(&mut self) {
        self.training = false;
    }

    pub const fn is_train_mode(&self) -> bool {
        self.training
    }

    /// 在推理模式下执行 `f`，结束后恢复进入前的模式（`f` 出错时同样恢复）
    ///
    /// 模型评估、冻结导出都经由这里，保证不会采样 dropout 掩码。
    pub fn no_grad_scope<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let previous = self.training;
        self.training = false;
        let result = f(self);
        self.training = previous;
        result
    }
}
