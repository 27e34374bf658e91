mod auth_dto;

pub use auth_dto::{
    AuthUserDto, ChangePasswordDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto,
    SessionDto, SignUpHomeownerDto, SignUpProviderDto, SignUpResponseDto,
};
