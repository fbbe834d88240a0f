use thiserror::Error;

/// 一意性制約の違反
///
/// 事前チェックをすり抜けた同時書き込みを、アダプターが保存時に報告するためのエラー。
/// ポートの`Box<dyn Error>`に包んで返され、アプリケーション層でダウンキャストされる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("isbn already exists")]
    Isbn,

    #[error("cpf already registered")]
    Cpf,

    #[error("email already registered")]
    Email,

    #[error("book already has an open loan")]
    OpenLoan,
}
