//! 登录表单编码
//!
//! 表单体格式：`password=<pw>&csrf_token=<token>`。
//!
//! `+`、`=`、`&` 是表单本身的分隔符，因此字段值里的这三个字符必须被百分号转义，
//! 绝不能原样出现。编码使用 `url::form_urlencoded`（与 WHATWG 表单编码一致）。

use url::form_urlencoded;

use crate::constants::{CSRF_FORM_FIELD, PASSWORD_FORM_FIELD};

/// 构建登录表单请求体
///
/// # 示例
///
/// ```rust
/// use racer_protocol::login_form_body;
///
/// let body = login_form_body("a+b=c&d", "tok");
/// assert_eq!(body, "password=a%2Bb%3Dc%26d&csrf_token=tok");
/// ```
pub fn login_form_body(password: &str, csrf_token: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(PASSWORD_FORM_FIELD, password)
        .append_pair(CSRF_FORM_FIELD, csrf_token)
        .finish()
}
